//! In-memory world that scripts dice and records what the handlers showed

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{Die, World};
use crate::value_objects::{AgentId, Announcement, Cue, CueSite, PieceId, Vec3, ZoneId};

/// Die whose face is fixed at spawn time
#[derive(Debug)]
pub struct RecordedDie {
    owner: PieceId,
    face: u8,
    position: Vec3,
    impulse: Mutex<Option<Vec3>>,
    /// Settle checks that must pass after the throw before it reports rest
    settle_after: u32,
    checks_after_roll: AtomicU32,
    retired: AtomicBool,
}

impl RecordedDie {
    pub fn owner(&self) -> PieceId {
        self.owner
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Impulse the die was thrown with
    pub fn impulse(&self) -> Option<Vec3> {
        *self.impulse.lock()
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }
}

impl Die for RecordedDie {
    fn roll(&self, impulse: Vec3) {
        let mut slot = self.impulse.lock();
        if slot.is_none() {
            *slot = Some(impulse);
        }
    }

    fn is_before_roll(&self) -> bool {
        self.impulse.lock().is_none()
    }

    fn is_settled(&self) -> bool {
        if self.is_before_roll() {
            return false;
        }
        let checks = self.checks_after_roll.fetch_add(1, Ordering::SeqCst) + 1;
        checks > self.settle_after
    }

    fn value(&self) -> u8 {
        self.face
    }

    fn retire(&self, _linger: Duration) {
        self.retired.store(true, Ordering::SeqCst);
    }
}

/// Scriptable [`World`] for tests and demos
#[derive(Debug, Default)]
pub struct RecordingWorld {
    agents: Mutex<HashMap<PieceId, AgentId>>,
    locations: Mutex<HashMap<PieceId, Vec3>>,
    faces: Mutex<VecDeque<u8>>,
    settle_after: AtomicU32,
    dice: Mutex<Vec<Arc<RecordedDie>>>,
    clears: AtomicUsize,
    announcements: Mutex<Vec<Announcement>>,
    cues: Mutex<Vec<(Cue, CueSite)>>,
    selections: Mutex<Vec<(ZoneId, bool)>>,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a live agent behind `piece` standing at `location`
    pub fn seat(&self, piece: PieceId, agent: AgentId, location: Vec3) {
        self.agents.lock().insert(piece, agent);
        self.locations.lock().insert(piece, location);
    }

    /// The agent behind `piece` leaves the table
    pub fn leave(&self, piece: PieceId) {
        self.agents.lock().remove(&piece);
        self.locations.lock().remove(&piece);
    }

    /// Faces handed to the next spawned dice, in order; unscripted dice show 1
    pub fn script_faces(&self, faces: impl IntoIterator<Item = u8>) {
        self.faces.lock().extend(faces);
    }

    /// Number of settle checks a thrown die fails before reporting rest
    pub fn set_settle_after(&self, checks: u32) {
        self.settle_after.store(checks, Ordering::SeqCst);
    }

    pub fn dice(&self) -> Vec<Arc<RecordedDie>> {
        self.dice.lock().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements.lock().clone()
    }

    pub fn last_announcement(&self) -> Option<Announcement> {
        self.announcements.lock().last().cloned()
    }

    pub fn cues(&self) -> Vec<(Cue, CueSite)> {
        self.cues.lock().clone()
    }

    pub fn selections(&self) -> Vec<(ZoneId, bool)> {
        self.selections.lock().clone()
    }
}

impl World for RecordingWorld {
    fn agent_of(&self, piece: PieceId) -> Option<AgentId> {
        self.agents.lock().get(&piece).copied()
    }

    fn agent_location(&self, piece: PieceId) -> Option<Vec3> {
        self.locations.lock().get(&piece).copied()
    }

    fn clear_dice(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        for die in self.dice.lock().iter() {
            die.retired.store(true, Ordering::SeqCst);
        }
    }

    fn spawn_die(&self, owner: PieceId, anchor: Vec3, offset: Vec3) -> Arc<dyn Die> {
        let face = self.faces.lock().pop_front().unwrap_or(1);
        let die = Arc::new(RecordedDie {
            owner,
            face,
            position: anchor.add(offset),
            impulse: Mutex::new(None),
            settle_after: self.settle_after.load(Ordering::SeqCst),
            checks_after_roll: AtomicU32::new(0),
            retired: AtomicBool::new(false),
        });
        self.dice.lock().push(die.clone());
        die
    }

    fn announce(&self, announcement: Announcement) {
        self.announcements.lock().push(announcement);
    }

    fn play_cue(&self, cue: Cue, site: CueSite) {
        self.cues.lock().push((cue, site));
    }

    fn show_selection(&self, zone: ZoneId, selected: bool) {
        self.selections.lock().push((zone, selected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_faces_in_order() {
        let world = RecordingWorld::new();
        world.script_faces([4, 2]);
        let piece = PieceId::new();
        let a = world.spawn_die(piece, Vec3::default(), Vec3::default());
        let b = world.spawn_die(piece, Vec3::default(), Vec3::default());
        let c = world.spawn_die(piece, Vec3::default(), Vec3::default());
        assert_eq!((a.value(), b.value(), c.value()), (4, 2, 1));
    }

    #[test]
    fn test_die_settles_after_checks() {
        let world = RecordingWorld::new();
        world.set_settle_after(2);
        let die = world.spawn_die(PieceId::new(), Vec3::default(), Vec3::default());

        assert!(die.is_before_roll());
        assert!(!die.is_settled());

        die.roll(Vec3::UP);
        die.roll(Vec3::new(5.0, 0.0, 0.0));
        assert!(!die.is_settled());
        assert!(!die.is_settled());
        assert!(die.is_settled());
        assert_eq!(world.dice()[0].impulse(), Some(Vec3::UP));
    }

    #[test]
    fn test_seat_and_leave() {
        let world = RecordingWorld::new();
        let piece = PieceId::new();
        let agent = AgentId::new();
        world.seat(piece, agent, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(world.agent_of(piece), Some(agent));
        world.leave(piece);
        assert_eq!(world.agent_of(piece), None);
        assert_eq!(world.agent_location(piece), None);
    }
}
