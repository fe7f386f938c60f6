//! Response gate: single-slot, at-most-once handoff from an event callback
//! back to the suspended handler.
//!
//! The gate is split in two halves. [`Responder`] is cheap to clone and is
//! moved into every trigger, text handler and timeout fallback of a session;
//! the first [`Responder::send`] wins and every later send is dropped.
//! [`ResponseGate::receive`] consumes the single value. When the last
//! responder is dropped without sending (the owning session was disposed by
//! a newer dialog) the receiver wakes with `None` instead of hanging.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Create a connected responder/gate pair
pub fn response_gate<T>() -> (Responder<T>, ResponseGate<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Responder {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        ResponseGate { rx },
    )
}

/// Writing half of a response gate
pub struct Responder<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Responder<T> {
    /// Deliver `value` if nothing was delivered yet. Returns whether this
    /// call was the one that settled the gate.
    pub fn send(&self, value: T) -> bool {
        match self.slot.lock().take() {
            Some(tx) => {
                // Receiver gone means the handler already gave up; still settled.
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    /// Whether some responder already settled the gate
    pub fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Reading half of a response gate
pub struct ResponseGate<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> ResponseGate<T> {
    /// Suspend until a value is sent. `None` means every responder was
    /// dropped without sending.
    pub async fn receive(self) -> Option<T> {
        self.rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_send_wins() {
        let (tx, gate) = response_gate::<i32>();
        let other = tx.clone();

        assert!(tx.send(1));
        assert!(!other.send(2));
        assert!(other.is_settled());
        assert_eq!(gate.receive().await, Some(1));
    }

    #[tokio::test]
    async fn test_dropped_responders_close_gate() {
        let (tx, gate) = response_gate::<bool>();
        drop(tx);
        assert_eq!(gate.receive().await, None);
    }

    #[tokio::test]
    async fn test_receive_waits_for_send() {
        let (tx, gate) = response_gate::<&'static str>();
        let waiter = tokio::spawn(gate.receive());
        tokio::task::yield_now().await;
        tx.send("late");
        assert_eq!(waiter.await.unwrap(), Some("late"));
    }
}
