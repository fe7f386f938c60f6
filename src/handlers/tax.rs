//! Tax dialog: a decelerating countdown the piece stops by clicking the zone
//!
//! Letting the countdown run out costs the full amount. Only an explicit stop
//! keeps the decayed value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use super::{LoopState, loop_state, mismatched};
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::polling::{Poll, poll_until};
use crate::requests::{DialogRequest, DialogResponse, RequestKind, TaxRequest};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{Announcement, Cue, CueSite, GameMessage, Region};

const TICK_STAY_MS: u64 = 1_000;
const RESULT_STAY_MS: u64 = 2_000;

/// Built-in tax handler
pub struct TaxHandler;

#[async_trait]
impl RequestHandler for TaxHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Tax(request) = request else {
            return Err(mismatched(RequestKind::Tax, actual));
        };
        collect_tax(dispatcher, request).await.map(DialogResponse::Tax)
    }
}

/// Discrete quadratic decay from `max` towards zero
#[derive(Debug, Clone)]
pub struct TaxCountdown {
    value: f64,
    speed: f64,
    deceleration: f64,
}

impl TaxCountdown {
    pub fn new(max: i64, deceleration: f64) -> Self {
        Self {
            value: max as f64,
            speed: 0.0,
            deceleration,
        }
    }

    /// Advance one tick and return the amount now on display
    pub fn tick(&mut self) -> i64 {
        self.value -= self.speed;
        self.speed += self.deceleration;
        (self.value.round() as i64).max(0)
    }
}

/// Run the countdown and return the tax the piece pays
pub async fn collect_tax(dispatcher: &Dispatcher, request: TaxRequest) -> DialogResult<i64> {
    let max = request.max;
    if max < 0 {
        return Err(DialogError::invalid(RequestKind::Tax, format!("negative tax ceiling {max}")));
    }

    let world = dispatcher.world();
    let config = dispatcher.config();
    let piece = request.piece.id;
    let site = CueSite::Piece(piece);

    let stop = Arc::new(AtomicBool::new(false));
    let session = dispatcher.open(
        SessionBuilder::new(RequestKind::Tax, piece)
            .message(GameMessage::Tax.prompt())
            .trigger(Trigger::new(Region::Zone(request.zone.id), {
                let stop = stop.clone();
                move |hit| {
                    stop.store(true, Ordering::SeqCst);
                    hit.session.dispose(DisposeReason::Answered);
                }
            })),
    );

    let mut countdown = TaxCountdown::new(max, config.tax_deceleration);
    let mut amount = max;
    let mut last = 0;
    let mut superseded = false;
    if amount > 0 {
        poll_until(config.tick(), || {
            amount = countdown.tick();
            world.announce(Announcement::new(amount.to_string(), GameMessage::Tax.prompt(), TICK_STAY_MS));
            if amount != last {
                last = amount;
                world.play_cue(Cue::TaxTick, site);
            }
            match loop_state(&stop, &session) {
                LoopState::Running if amount > 0 => Poll::Continue,
                LoopState::Running | LoopState::Stopped => Poll::Done,
                LoopState::Superseded => {
                    superseded = true;
                    Poll::Done
                }
            }
        })
        .await;
    }

    if superseded {
        return Err(DialogError::Superseded { kind: RequestKind::Tax });
    }
    session.dispose(DisposeReason::Completed);

    if !stop.load(Ordering::SeqCst) {
        info!(target: DIALOG_TARGET, zone = %request.zone.name, max, "tax countdown ran out, full amount due");
        amount = max;
        world.play_cue(Cue::TaxPenalty, site);
    }
    world.announce(Announcement::new(amount.to_string(), "", RESULT_STAY_MS));
    tokio::time::sleep(config.tax_linger()).await;
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_first_tick_shows_max() {
        let mut countdown = TaxCountdown::new(100, 0.04);
        assert_eq!(countdown.tick(), 100);
        assert_eq!(countdown.tick(), 100);
    }

    #[test]
    fn test_countdown_reaches_zero_and_stays() {
        let mut countdown = TaxCountdown::new(10, 0.04);
        let mut ticks = 0;
        while countdown.tick() > 0 {
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert_eq!(countdown.tick(), 0);
    }

    #[test]
    fn test_countdown_decays_faster_over_time() {
        let mut countdown = TaxCountdown::new(1_000, 0.04);
        let early: Vec<i64> = (0..50).map(|_| countdown.tick()).collect();
        let late: Vec<i64> = (0..50).map(|_| countdown.tick()).collect();
        let early_drop = early[0] - early[49];
        let late_drop = late[0] - late[49];
        assert!(late_drop > early_drop);
    }
}
