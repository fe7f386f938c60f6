//! Dice dialog: spawn dice around the piece, wait for the throw, wait for rest

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use super::mismatched;
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::polling::{Poll, poll_until};
use crate::requests::{DiceRequest, DialogRequest, DialogResponse, RequestKind};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{Announcement, GameMessage, Region, Vec3};
use crate::world::Die;

/// How long spent dice stay on the board
const RETIRE_LINGER: Duration = Duration::from_secs(3);

/// How long the result title stays up
const TITLE_STAY_MS: u64 = 3_000;

/// Settled dice faces and how they are shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    values: Vec<u8>,
    message: GameMessage,
}

impl DiceRoll {
    pub fn new(values: Vec<u8>, message: GameMessage) -> Self {
        Self { values, message }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn total(&self) -> u32 {
        self.values.iter().map(|v| u32::from(*v)).sum()
    }

    /// Several dice, all equal, on a plain roll. Fate and moonwalk rolls
    /// never count as doubles.
    pub fn is_double(&self) -> bool {
        self.values.len() > 1
            && self.values.iter().all(|v| *v == self.values[0])
            && self.message == GameMessage::RollTheDice
    }

    /// `"4+4"`, `"1+2+3=6"`, `"double!! 2+2"`
    pub fn display(&self) -> String {
        let mut text = String::new();
        if self.is_double() {
            text.push_str("double!! ");
        }
        let faces: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        text.push_str(&faces.join("+"));
        if self.values.len() > 2 {
            text.push_str(&format!("={}", self.total()));
        }
        text
    }

    pub fn into_values(self) -> Vec<u8> {
        self.values
    }
}

/// Built-in dice handler
pub struct DiceHandler;

#[async_trait]
impl RequestHandler for DiceHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Dice(request) = request else {
            return Err(mismatched(RequestKind::Dice, actual));
        };
        roll_dice(dispatcher, request).await.map(DialogResponse::Dice)
    }
}

/// Run the dice dialog and return the face of every die in spawn order
pub async fn roll_dice(dispatcher: &Dispatcher, request: DiceRequest) -> DialogResult<Vec<u8>> {
    if request.count == 0 {
        return Err(DialogError::invalid(RequestKind::Dice, "at least one die is required"));
    }

    let world = dispatcher.world();
    let config = dispatcher.config();
    let piece = request.piece.id;
    let count = request.count;

    world.clear_dice();

    let lift = Vec3::new(0.0, config.dice_height, 0.0);
    let anchor = world
        .agent_location(piece)
        .map(|at| at.add(lift))
        .unwrap_or(config.board_center);
    let offset = Vec3::new(if count > 1 { config.dice_radius } else { 0.0 }, config.dice_height, 0.0);
    let step = (360.0 / count as f64).to_radians();

    let dice: Arc<Vec<Arc<dyn Die>>> = Arc::new(
        (0..count)
            .map(|i| world.spawn_die(piece, anchor, offset.rotate_around_y(step * i as f64)))
            .collect(),
    );
    let jitters: Vec<Vec3> = dispatcher.with_rng(|rng| {
        (0..count)
            .map(|_| {
                Vec3::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5))
                    .normalize()
                    .scale(config.dice_jitter)
            })
            .collect()
    });

    let thrown = dice.clone();
    let unthrown = dice.clone();
    let session = dispatcher.open(
        SessionBuilder::new(RequestKind::Dice, piece)
            .message(request.message.prompt())
            .trigger(Trigger::new(Region::Board, move |hit| {
                for (die, jitter) in thrown.iter().zip(&jitters) {
                    die.roll(hit.aim.add(*jitter));
                }
                hit.session.dispose(DisposeReason::Answered);
            }))
            .timeout(request.message.label(), config.dice_timeout(), move |_| {
                force_roll(&unthrown);
            }),
    );

    poll_until(config.tick(), || {
        if session.is_disposed() || world.agent_of(piece).is_none() {
            force_roll(&dice);
        }
        if dice.iter().all(|die| die.is_settled()) {
            Poll::Done
        } else {
            Poll::Continue
        }
    })
    .await;
    session.dispose(DisposeReason::Completed);

    for die in dice.iter() {
        die.retire(RETIRE_LINGER);
    }

    let roll = DiceRoll::new(dice.iter().map(|die| die.value()).collect(), request.message);
    info!(target: DIALOG_TARGET, values = ?roll.values(), double = roll.is_double(), "dice settled");
    world.announce(Announcement::new(roll.display(), request.piece.name.clone(), TITLE_STAY_MS));

    tokio::time::sleep(config.dice_linger()).await;
    Ok(roll.into_values())
}

/// Throw every die that has not been thrown yet straight up
fn force_roll(dice: &[Arc<dyn Die>]) {
    let mut forced = 0;
    for die in dice.iter().filter(|die| die.is_before_roll()) {
        die.roll(Vec3::UP);
        forced += 1;
    }
    if forced > 0 {
        debug!(target: DIALOG_TARGET, forced, "dice thrown without a click");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_needs_plain_roll() {
        assert!(DiceRoll::new(vec![4, 4], GameMessage::RollTheDice).is_double());
        assert!(!DiceRoll::new(vec![3, 5], GameMessage::RollTheDice).is_double());
        assert!(!DiceRoll::new(vec![6], GameMessage::RollTheDice).is_double());
        assert!(!DiceRoll::new(vec![2, 2], GameMessage::RollTheDiceForGamble).is_double());
        assert!(!DiceRoll::new(vec![2, 2], GameMessage::RollTheDiceForMoonwalk).is_double());
    }

    #[test]
    fn test_sum_suffix_only_above_two_dice() {
        assert_eq!(DiceRoll::new(vec![1, 2, 3], GameMessage::RollTheDice).display(), "1+2+3=6");
        assert_eq!(DiceRoll::new(vec![3, 5], GameMessage::RollTheDice).display(), "3+5");
        assert_eq!(DiceRoll::new(vec![4, 4], GameMessage::RollTheDice).display(), "double!! 4+4");
        assert_eq!(DiceRoll::new(vec![5], GameMessage::RollTheDice).display(), "5");
    }

    #[test]
    fn test_triple_double_shows_sum() {
        let roll = DiceRoll::new(vec![2, 2, 2], GameMessage::RollTheDice);
        assert_eq!(roll.display(), "double!! 2+2+2=6");
        assert_eq!(roll.total(), 6);
    }
}
