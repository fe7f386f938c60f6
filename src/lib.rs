//! Board dialog dispatcher
//!
//! This crate brokers the decisions a turn-based board game needs from its
//! players. The rules engine issues a typed dialog request and awaits the
//! answer; the dispatcher presents it as the single live dialog session,
//! routes clicks, typed text and elapsed time into it, and resolves exactly
//! one result per request. It provides:
//! - A dispatcher with a per-kind handler table and strict one-session-at-a-time
//!   mutual exclusion
//! - Built-in handlers for dice, upgrades, acquisitions, seizures, bets, tax,
//!   zone and piece targeting and magic draws
//! - Response gates, timeout timers and a tick-driven polling loop as the
//!   suspension primitives handlers are written with
//! - Lifecycle events and an activity projection for observers
//!
//! The board itself stays outside: handlers reach dice, titles and sounds
//! through the [`World`] trait.

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod gate;
pub mod handlers;
pub mod polling;
pub mod projections;
pub mod requests;
pub mod session;
pub mod timer;
pub mod value_objects;
pub mod world;

/// Tracing target for every dialog log line
pub(crate) const DIALOG_TARGET: &str = "board_dialog::dialog";

// Re-export main types
pub use config::DialogConfig;

pub use dispatcher::{Dispatcher, HandlerTable, RequestHandler};

pub use errors::{DialogError, DialogResult};

pub use events::{
    DialogEvent, DialogResolved, DisposeReason, SessionDisposed, SessionEvent,
    SessionOpened, TextSubmitted, TimeoutFired, TriggerHit,
};

pub use gate::{Responder, ResponseGate, response_gate};
pub use polling::{Poll, poll_until};
pub use projections::{DialogActivity, DialogProjection};

pub use requests::{
    AcquisitionRequest, BettingRequest, DialogRequest, DialogResponse, DiceRequest,
    MagicRequest, RequestKind, SeizureRequest, TargetPieceRequest, TargetZoneRequest,
    TaxRequest, UpgradeRequest,
};

pub use session::{DialogSession, Hit, SessionBuilder, SessionView, Submission, Trigger};
pub use timer::TimeoutTimer;

pub use value_objects::{
    AgentId, Announcement, Cue, CueSite, GameMessage, Magic, PieceId, PieceRef,
    PropertyLevel, PropertyRef, Region, SessionId, Vec3, ZoneId, ZoneRef,
};

pub use world::{Die, RecordedDie, RecordingWorld, World};
