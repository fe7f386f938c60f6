//! Presentation-layer collaborators the handlers talk to
//!
//! The board, the dice models, titles and sounds all live outside this crate.
//! Handlers only see them through [`World`] and [`Die`]; the presentation
//! layer implements both. [`RecordingWorld`] is an in-memory implementation
//! for tests and demos.

mod recording;

pub use recording::{RecordedDie, RecordingWorld};

use std::sync::Arc;
use std::time::Duration;

use crate::value_objects::{AgentId, Announcement, Cue, CueSite, PieceId, Vec3, ZoneId};

/// A physical die proxy spawned for one roll
pub trait Die: Send + Sync {
    /// Throw the die with `impulse`; ignored once it was thrown
    fn roll(&self, impulse: Vec3);

    /// Still waiting to be thrown
    fn is_before_roll(&self) -> bool;

    /// Thrown and come to rest
    fn is_settled(&self) -> bool;

    /// Face currently pointing up
    fn value(&self) -> u8;

    /// Remove the proxy after `linger`
    fn retire(&self, linger: Duration);
}

/// Engine lookups and presentation services used by the handlers
pub trait World: Send + Sync {
    /// Live agent currently playing `piece`
    fn agent_of(&self, piece: PieceId) -> Option<AgentId>;

    /// Where the agent playing `piece` stands, if it is live
    fn agent_location(&self, piece: PieceId) -> Option<Vec3>;

    /// Remove dice left over from earlier rolls
    fn clear_dice(&self);

    fn spawn_die(&self, owner: PieceId, anchor: Vec3, offset: Vec3) -> Arc<dyn Die>;

    fn announce(&self, announcement: Announcement);

    fn play_cue(&self, cue: Cue, site: CueSite);

    /// Per-tick selected/unselected feedback on a property during seizure
    fn show_selection(&self, zone: ZoneId, selected: bool);
}
