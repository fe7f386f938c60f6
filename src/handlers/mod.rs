//! Built-in handlers, one per request kind
//!
//! Every handler follows the same shape: build a [`SessionBuilder`], install
//! it through [`Dispatcher::open`], then suspend on a response gate or a
//! polling loop until a trigger, the text handler, the timeout or a loop
//! condition produces the answer.
//!
//! [`SessionBuilder`]: crate::session::SessionBuilder
//! [`Dispatcher::open`]: crate::dispatcher::Dispatcher::open

mod betting;
mod confirm;
mod dice;
mod magic;
mod seizure;
mod target;
mod tax;

pub use betting::{BettingHandler, parse_bet, place_bet};
pub use confirm::{AcquisitionHandler, UpgradeHandler, confirm_acquisition, confirm_upgrade};
pub use dice::{DiceHandler, DiceRoll, roll_dice};
pub use magic::{MagicHandler, draw_magic};
pub use seizure::{SeizureHandler, select_seizure};
pub use target::{TargetPieceHandler, TargetZoneHandler, target_piece, target_zone};
pub use tax::{TaxCountdown, TaxHandler, collect_tax};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::DialogError;
use crate::requests::RequestKind;
use crate::session::DialogSession;

pub(crate) fn mismatched(expected: RequestKind, actual: RequestKind) -> DialogError {
    DialogError::MismatchedRequest { expected, actual }
}

/// State of a loop that a trigger or timeout stops through a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopState {
    Running,
    Stopped,
    Superseded,
}

/// Every stop path stores the flag before it disposes the session, so the
/// disposed flag is read first and the stop flag after it.
pub(crate) fn loop_state(stop: &AtomicBool, session: &DialogSession) -> LoopState {
    if session.is_disposed() {
        if stop.load(Ordering::SeqCst) {
            LoopState::Stopped
        } else {
            LoopState::Superseded
        }
    } else if stop.load(Ordering::SeqCst) {
        LoopState::Stopped
    } else {
        LoopState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DisposeReason;
    use crate::session::SessionBuilder;
    use crate::value_objects::{AgentId, PieceId};
    use tokio::sync::broadcast;

    fn session() -> std::sync::Arc<DialogSession> {
        let (events, _) = broadcast::channel(4);
        SessionBuilder::new(RequestKind::Tax, PieceId::new()).build(Some(AgentId::new()), events)
    }

    #[test]
    fn test_stop_then_dispose_counts_as_stopped() {
        let session = session();
        let stop = AtomicBool::new(false);
        assert_eq!(loop_state(&stop, &session), LoopState::Running);

        // a click or timeout landing between two ticks
        stop.store(true, Ordering::SeqCst);
        session.dispose(DisposeReason::Answered);
        assert_eq!(loop_state(&stop, &session), LoopState::Stopped);
    }

    #[test]
    fn test_stop_before_dispose_counts_as_stopped() {
        let session = session();
        let stop = AtomicBool::new(false);
        stop.store(true, Ordering::SeqCst);
        assert_eq!(loop_state(&stop, &session), LoopState::Stopped);
    }

    #[test]
    fn test_dispose_without_stop_is_superseded() {
        let session = session();
        let stop = AtomicBool::new(false);
        session.dispose(DisposeReason::Superseded);
        assert_eq!(loop_state(&stop, &session), LoopState::Superseded);
    }
}
