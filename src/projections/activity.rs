//! Running counters over the dispatcher's event stream

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::DialogProjection;
use crate::DIALOG_TARGET;
use crate::events::{DialogEvent, DisposeReason};
use crate::requests::RequestKind;
use crate::value_objects::SessionId;

/// Resolved dialogs per request kind
pub type ResolvedCount = HashMap<RequestKind, usize>;

/// How much dialog traffic the table has seen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogActivity {
    pub opened: usize,
    pub disposed: usize,
    pub timeouts: usize,
    pub superseded: usize,
    pub trigger_hits: usize,
    pub text_submissions: usize,
    pub resolved: ResolvedCount,
    /// Session currently waiting for input
    pub open_session: Option<SessionId>,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl DialogActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved(&self, kind: RequestKind) -> usize {
        self.resolved.get(&kind).copied().unwrap_or(0)
    }

    /// Fold events from `events` until the dispatcher is dropped.
    ///
    /// Lagging behind the channel skips the lost events and keeps going.
    pub async fn follow(&mut self, mut events: broadcast::Receiver<DialogEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.apply_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: DIALOG_TARGET, skipped, "activity projection lagged");
                }
                Err(RecvError::Closed) => return,
            }
        }
    }
}

impl DialogProjection for DialogActivity {
    fn apply_event(&mut self, event: &DialogEvent) {
        match event {
            DialogEvent::SessionOpened(e) => {
                self.opened += 1;
                self.open_session = Some(e.session_id);
                self.last_event_at = Some(e.opened_at);
            }
            DialogEvent::TriggerHit(e) => {
                self.trigger_hits += 1;
                self.last_event_at = Some(e.hit_at);
            }
            DialogEvent::TextSubmitted(e) => {
                self.text_submissions += 1;
                self.last_event_at = Some(e.submitted_at);
            }
            DialogEvent::TimeoutFired(e) => {
                self.timeouts += 1;
                self.last_event_at = Some(e.fired_at);
            }
            DialogEvent::SessionDisposed(e) => {
                self.disposed += 1;
                if e.reason == DisposeReason::Superseded {
                    self.superseded += 1;
                }
                if self.open_session == Some(e.session_id) {
                    self.open_session = None;
                }
                self.last_event_at = Some(e.disposed_at);
            }
            DialogEvent::DialogResolved(e) => {
                *self.resolved.entry(e.kind).or_default() += 1;
                self.last_event_at = Some(e.resolved_at);
            }
        }
    }

    fn id(&self) -> &str {
        "dialog-activity"
    }
}
