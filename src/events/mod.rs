//! Dialog lifecycle events
//!
//! The dispatcher publishes one event per observable step of a session's
//! life. Nothing inside the crate depends on them; they exist for the
//! presentation layer and for projections such as
//! [`DialogActivity`](crate::projections::DialogActivity).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::requests::RequestKind;
use crate::value_objects::{AgentId, PieceId, Region, SessionId};

/// Common surface of every lifecycle event
pub trait SessionEvent {
    /// Subject the event would be published under
    fn subject(&self) -> String;

    /// Session the event belongs to, if any
    fn session_id(&self) -> Option<SessionId>;

    fn event_type(&self) -> &'static str;
}

/// Why a session stopped accepting input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisposeReason {
    /// A trigger or text submission settled the dialog
    Answered,
    /// The timeout fallback ran
    TimedOut,
    /// A newer dialog was installed over it
    Superseded,
    /// The handler finished its own loop
    Completed,
    /// Disposed from outside through `Dispatcher::dispose_current`
    Cleared,
}

/// A session was installed as the current dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub piece: PieceId,
    pub kind: RequestKind,
    pub opened_at: DateTime<Utc>,
}

impl SessionEvent for SessionOpened {
    fn subject(&self) -> String {
        "dialog.session.opened.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        Some(self.session_id)
    }

    fn event_type(&self) -> &'static str {
        "SessionOpened"
    }
}

/// A click landed on a live trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerHit {
    pub session_id: SessionId,
    pub agent: AgentId,
    pub region: Region,
    pub hit_at: DateTime<Utc>,
}

impl SessionEvent for TriggerHit {
    fn subject(&self) -> String {
        "dialog.trigger.hit.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        Some(self.session_id)
    }

    fn event_type(&self) -> &'static str {
        "TriggerHit"
    }
}

/// Free text reached a session's text handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSubmitted {
    pub session_id: SessionId,
    pub agent: AgentId,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

impl SessionEvent for TextSubmitted {
    fn subject(&self) -> String {
        "dialog.text.submitted.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        Some(self.session_id)
    }

    fn event_type(&self) -> &'static str {
        "TextSubmitted"
    }
}

/// A session deadline expired and its fallback ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutFired {
    pub session_id: SessionId,
    pub label: String,
    pub fired_at: DateTime<Utc>,
}

impl SessionEvent for TimeoutFired {
    fn subject(&self) -> String {
        "dialog.timeout.fired.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        Some(self.session_id)
    }

    fn event_type(&self) -> &'static str {
        "TimeoutFired"
    }
}

/// A session was disposed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDisposed {
    pub session_id: SessionId,
    pub reason: DisposeReason,
    pub disposed_at: DateTime<Utc>,
}

impl SessionEvent for SessionDisposed {
    fn subject(&self) -> String {
        "dialog.session.disposed.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        Some(self.session_id)
    }

    fn event_type(&self) -> &'static str {
        "SessionDisposed"
    }
}

/// A handler returned its answer to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogResolved {
    pub kind: RequestKind,
    pub piece: PieceId,
    pub outcome: serde_json::Value,
    pub resolved_at: DateTime<Utc>,
}

impl SessionEvent for DialogResolved {
    fn subject(&self) -> String {
        "dialog.resolved.v1".to_string()
    }

    fn session_id(&self) -> Option<SessionId> {
        None
    }

    fn event_type(&self) -> &'static str {
        "DialogResolved"
    }
}

/// Every event the dispatcher publishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DialogEvent {
    SessionOpened(SessionOpened),
    TriggerHit(TriggerHit),
    TextSubmitted(TextSubmitted),
    TimeoutFired(TimeoutFired),
    SessionDisposed(SessionDisposed),
    DialogResolved(DialogResolved),
}

impl DialogEvent {
    fn inner(&self) -> &dyn SessionEvent {
        match self {
            Self::SessionOpened(e) => e,
            Self::TriggerHit(e) => e,
            Self::TextSubmitted(e) => e,
            Self::TimeoutFired(e) => e,
            Self::SessionDisposed(e) => e,
            Self::DialogResolved(e) => e,
        }
    }
}

impl SessionEvent for DialogEvent {
    fn subject(&self) -> String {
        self.inner().subject()
    }

    fn session_id(&self) -> Option<SessionId> {
        self.inner().session_id()
    }

    fn event_type(&self) -> &'static str {
        self.inner().event_type()
    }
}
