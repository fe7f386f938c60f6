//! Magic dialog: a slot machine over the candidate effects

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use super::{LoopState, loop_state, mismatched};
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::polling::{Poll, poll_until};
use crate::requests::{DialogRequest, DialogResponse, MagicRequest, RequestKind};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{Announcement, Cue, CueSite, GameMessage, Magic, Region};

const SPIN_SUBTITLE: &str = "click the board to choose your magic";
const SPIN_STAY_MS: u64 = 1_000;
const RESULT_STAY_MS: u64 = 2_000;

/// Built-in magic handler
pub struct MagicHandler;

#[async_trait]
impl RequestHandler for MagicHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Magic(request) = request else {
            return Err(mismatched(RequestKind::Magic, actual));
        };
        draw_magic(dispatcher, request).await.map(DialogResponse::Magic)
    }
}

/// Cycle through the candidates until the board is clicked or time runs out.
///
/// Every cycle announces the effect on show and then checks the stop flag,
/// so the effect that was on screen when the stop landed is the one drawn.
/// Draws are uniform and independent; repeats are allowed.
pub async fn draw_magic(dispatcher: &Dispatcher, request: MagicRequest) -> DialogResult<Magic> {
    if request.magics.is_empty() {
        return Err(DialogError::invalid(RequestKind::Magic, "no magic to draw from"));
    }

    let world = dispatcher.world();
    let config = dispatcher.config();
    let piece = request.piece.id;
    let magics: Vec<Magic> = request.magics.into_iter().collect();
    let draw = || dispatcher.with_rng(|rng| magics[rng.gen_range(0..magics.len())]);

    let stop = Arc::new(AtomicBool::new(false));
    let session = dispatcher.open(
        SessionBuilder::new(RequestKind::Magic, piece)
            .message(GameMessage::Magic.prompt())
            .trigger(Trigger::new(Region::Board, {
                let stop = stop.clone();
                move |hit| {
                    stop.store(true, Ordering::SeqCst);
                    hit.session.dispose(DisposeReason::Answered);
                }
            }))
            .timeout(GameMessage::Magic.label(), config.magic_timeout(), {
                let stop = stop.clone();
                move |_| stop.store(true, Ordering::SeqCst)
            }),
    );

    let mut current = draw();
    let mut superseded = false;
    poll_until(config.tick(), || {
        let (name, _) = current.info();
        world.announce(Announcement::new(name, SPIN_SUBTITLE, SPIN_STAY_MS));
        world.play_cue(Cue::MagicSpin, CueSite::Piece(piece));
        match loop_state(&stop, &session) {
            LoopState::Running => {
                current = draw();
                Poll::Continue
            }
            LoopState::Stopped => Poll::Done,
            LoopState::Superseded => {
                superseded = true;
                Poll::Done
            }
        }
    })
    .await;

    if superseded {
        return Err(DialogError::Superseded {
            kind: RequestKind::Magic,
        });
    }
    session.dispose(DisposeReason::Completed);

    let (name, description) = current.info();
    info!(target: DIALOG_TARGET, magic = name, "magic drawn");
    world.announce(Announcement::new(name, description, RESULT_STAY_MS));
    tokio::time::sleep(config.magic_linger()).await;
    Ok(current)
}
