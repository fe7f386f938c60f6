//! Read models folded from dialog lifecycle events

use crate::events::DialogEvent;

pub mod activity;

pub use activity::{DialogActivity, ResolvedCount};

/// Common trait for dialog projections
pub trait DialogProjection: Send + Sync {
    /// Update the projection based on an event
    fn apply_event(&mut self, event: &DialogEvent);

    /// Get the projection ID
    fn id(&self) -> &str;
}
