//! Cancelable delayed action backing every dialog timeout

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Runs an action once `duration` elapses unless cancelled first.
///
/// Dropping the timer cancels it.
#[derive(Debug)]
pub struct TimeoutTimer {
    deadline: Instant,
    task: JoinHandle<()>,
}

impl TimeoutTimer {
    /// Arm a timer on the current tokio runtime
    pub fn start<F>(duration: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + duration;
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            action();
        });
        Self { deadline, task }
    }

    /// Time left before the action fires
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Stop the timer; calling it again is a no-op
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TimeoutTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
