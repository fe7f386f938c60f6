//! Dialog session - the live, disposable presentation state of one prompt
//!
//! A session bundles:
//! - the prompt message and an optional action message re-evaluated on
//!   every render
//! - clickable triggers bound to board regions
//! - an optional free-text handler
//! - an optional timeout with a fallback
//!
//! Disposal is the only cancellation primitive. It is idempotent, cancels
//! the timeout, and drops every callback the session owns. Dropping the
//! callbacks releases any [`Responder`](crate::gate::Responder) they captured,
//! which is how a handler whose session was superseded learns that no answer
//! will ever come.
//!
//! All firing paths (click, text, timeout) and disposal run under one
//! per-session reentrant lock, so a session's callbacks never interleave with
//! each other and no callback starts once disposal has begun.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::DIALOG_TARGET;
use crate::events::{
    DialogEvent, DisposeReason, SessionDisposed, TextSubmitted, TimeoutFired, TriggerHit,
};
use crate::requests::RequestKind;
use crate::timer::TimeoutTimer;
use crate::value_objects::{AgentId, PieceId, Region, SessionId, Vec3};

/// Lazily rendered text
pub type MessageFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Trigger callback
pub type HitFn = Arc<dyn Fn(&Hit<'_>) + Send + Sync>;

/// Free-text callback
pub type TextFn = Arc<dyn Fn(&Submission<'_>) + Send + Sync>;

/// Timeout fallback, run at most once
pub type FallbackFn = Box<dyn FnOnce(&DialogSession) + Send>;

/// A click that landed on a live trigger
pub struct Hit<'a> {
    pub session: &'a DialogSession,
    pub agent: AgentId,
    /// Direction the clicking agent was facing
    pub aim: Vec3,
}

/// Free text sent by the session owner
pub struct Submission<'a> {
    pub session: &'a DialogSession,
    pub agent: AgentId,
    pub text: &'a str,
}

/// A clickable choice bound to a board region
pub struct Trigger {
    region: Region,
    on_hit: HitFn,
    label: Option<MessageFn>,
    display: Option<String>,
}

impl Trigger {
    pub fn new<F>(region: Region, on_hit: F) -> Self
    where
        F: Fn(&Hit<'_>) + Send + Sync + 'static,
    {
        Self {
            region,
            on_hit: Arc::new(on_hit),
            label: None,
            display: None,
        }
    }

    /// Hover text, evaluated on every render
    pub fn label<F>(mut self, label: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.label = Some(Arc::new(label));
        self
    }

    /// Static annotation floating over the region
    pub fn display(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }
}

struct TimeoutSpec {
    label: String,
    duration: Duration,
    fallback: FallbackFn,
}

/// Describes a session before the dispatcher installs it
pub struct SessionBuilder {
    kind: RequestKind,
    piece: PieceId,
    message: String,
    action_message: Option<MessageFn>,
    triggers: Vec<Trigger>,
    text_handler: Option<TextFn>,
    timeout: Option<TimeoutSpec>,
}

impl SessionBuilder {
    pub fn new(kind: RequestKind, piece: PieceId) -> Self {
        Self {
            kind,
            piece,
            message: String::new(),
            action_message: None,
            triggers: Vec::new(),
            text_handler: None,
            timeout: None,
        }
    }

    pub fn piece(&self) -> PieceId {
        self.piece
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn action_message<F>(mut self, message: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.action_message = Some(Arc::new(message));
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn on_text<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Submission<'_>) + Send + Sync + 'static,
    {
        self.text_handler = Some(Arc::new(handler));
        self
    }

    /// Run `fallback` and dispose the session once `duration` elapses
    pub fn timeout<F>(mut self, label: impl Into<String>, duration: Duration, fallback: F) -> Self
    where
        F: FnOnce(&DialogSession) + Send + 'static,
    {
        self.timeout = Some(TimeoutSpec {
            label: label.into(),
            duration,
            fallback: Box::new(fallback),
        });
        self
    }

    /// Build the session and arm its timeout
    pub(crate) fn build(
        self,
        owner: Option<AgentId>,
        events: broadcast::Sender<DialogEvent>,
    ) -> Arc<DialogSession> {
        let (timeout_label, timeout) = match self.timeout {
            Some(timeout) => (Some(timeout.label), Some((timeout.duration, timeout.fallback))),
            None => (None, None),
        };

        let session = Arc::new(DialogSession {
            id: SessionId::new(),
            kind: self.kind,
            piece: self.piece,
            owner,
            message: self.message,
            action_message: Mutex::new(self.action_message),
            triggers: Mutex::new(self.triggers),
            text_handler: Mutex::new(self.text_handler),
            timeout_label,
            timer: Mutex::new(None),
            fire_lock: ReentrantMutex::new(()),
            disposed: AtomicBool::new(false),
            events,
        });

        if let Some((duration, fallback)) = timeout {
            let weak = Arc::downgrade(&session);
            let timer = TimeoutTimer::start(duration, move || {
                if let Some(session) = weak.upgrade() {
                    session.fire_timeout(fallback);
                }
            });
            *session.timer.lock() = Some(timer);
        }

        session
    }
}

/// An installed dialog prompt
pub struct DialogSession {
    id: SessionId,
    kind: RequestKind,
    piece: PieceId,
    /// Agent allowed to click and type; `None` when the piece had no live agent
    owner: Option<AgentId>,
    message: String,
    action_message: Mutex<Option<MessageFn>>,
    triggers: Mutex<Vec<Trigger>>,
    text_handler: Mutex<Option<TextFn>>,
    timeout_label: Option<String>,
    timer: Mutex<Option<TimeoutTimer>>,
    /// Held while a callback runs and while disposing; callbacks dispose
    /// their own session from inside it
    fire_lock: ReentrantMutex<()>,
    disposed: AtomicBool,
    events: broadcast::Sender<DialogEvent>,
}

impl DialogSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn piece(&self) -> PieceId {
        self.piece
    }

    pub fn owner(&self) -> Option<AgentId> {
        self.owner
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Dispose the session. Returns `false` if it was already disposed.
    pub fn dispose(&self, reason: DisposeReason) -> bool {
        let _fire = self.fire_lock.lock();
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }

        if let Some(timer) = self.timer.lock().take() {
            timer.cancel();
        }
        let triggers = std::mem::take(&mut *self.triggers.lock());
        let text_handler = self.text_handler.lock().take();
        let action_message = self.action_message.lock().take();
        drop((triggers, text_handler, action_message));

        debug!(target: DIALOG_TARGET, session = %self.id, kind = %self.kind, ?reason, "session disposed");
        self.publish(DialogEvent::SessionDisposed(SessionDisposed {
            session_id: self.id,
            reason,
            disposed_at: Utc::now(),
        }));
        true
    }

    /// Route a click. Returns whether a trigger fired.
    pub fn click(&self, agent: AgentId, region: Region, aim: Vec3) -> bool {
        let _fire = self.fire_lock.lock();
        if self.is_disposed() || self.owner != Some(agent) {
            return false;
        }

        let on_hit = self
            .triggers
            .lock()
            .iter()
            .find(|t| t.region == region)
            .map(|t| t.on_hit.clone());
        let Some(on_hit) = on_hit else {
            return false;
        };

        debug!(target: DIALOG_TARGET, session = %self.id, ?region, "trigger hit");
        self.publish(DialogEvent::TriggerHit(TriggerHit {
            session_id: self.id,
            agent,
            region,
            hit_at: Utc::now(),
        }));
        on_hit(&Hit {
            session: self,
            agent,
            aim,
        });
        true
    }

    /// Route free text. Returns whether the session had a text handler.
    pub fn submit_text(&self, agent: AgentId, text: &str) -> bool {
        let _fire = self.fire_lock.lock();
        if self.is_disposed() || self.owner != Some(agent) {
            return false;
        }

        let Some(handler) = self.text_handler.lock().clone() else {
            return false;
        };

        debug!(target: DIALOG_TARGET, session = %self.id, text, "text submitted");
        self.publish(DialogEvent::TextSubmitted(TextSubmitted {
            session_id: self.id,
            agent,
            text: text.to_string(),
            submitted_at: Utc::now(),
        }));
        handler(&Submission {
            session: self,
            agent,
            text,
        });
        true
    }

    fn fire_timeout(&self, fallback: FallbackFn) {
        let _fire = self.fire_lock.lock();
        if self.is_disposed() {
            return;
        }

        let label = self.timeout_label.clone().unwrap_or_default();
        info!(target: DIALOG_TARGET, session = %self.id, kind = %self.kind, %label, "dialog timed out");
        self.publish(DialogEvent::TimeoutFired(TimeoutFired {
            session_id: self.id,
            label,
            fired_at: Utc::now(),
        }));
        fallback(self);
        self.dispose(DisposeReason::TimedOut);
    }

    /// Snapshot for the presentation layer; `None` once disposed
    pub fn render(&self) -> Option<SessionView> {
        if self.is_disposed() {
            return None;
        }

        let action_message = self.action_message.lock().clone();
        let triggers: Vec<_> = self
            .triggers
            .lock()
            .iter()
            .map(|t| (t.region, t.label.clone(), t.display.clone()))
            .collect();
        let timeout = match (&self.timeout_label, self.timer.lock().as_ref()) {
            (Some(label), Some(timer)) => Some(TimeoutView {
                label: label.clone(),
                remaining_ms: timer.remaining().as_millis() as u64,
            }),
            _ => None,
        };

        Some(SessionView {
            session_id: self.id,
            kind: self.kind,
            piece: self.piece,
            message: self.message.clone(),
            action_message: action_message.map(|f| f()),
            triggers: triggers
                .into_iter()
                .map(|(region, label, display)| TriggerView {
                    region,
                    label: label.map(|f| f()),
                    display,
                })
                .collect(),
            accepts_text: self.text_handler.lock().is_some(),
            timeout,
        })
    }

    pub(crate) fn publish(&self, event: DialogEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for DialogSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogSession")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("piece", &self.piece)
            .field("owner", &self.owner)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// What the presentation layer draws for a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub kind: RequestKind,
    pub piece: PieceId,
    pub message: String,
    pub action_message: Option<String>,
    pub triggers: Vec<TriggerView>,
    pub accepts_text: bool,
    pub timeout: Option<TimeoutView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerView {
    pub region: Region,
    pub label: Option<String>,
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeoutView {
    pub label: String,
    pub remaining_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;

    fn build(builder: SessionBuilder, owner: AgentId) -> Arc<DialogSession> {
        let (events, _) = broadcast::channel(16);
        builder.build(Some(owner), events)
    }

    #[tokio::test]
    async fn test_click_only_from_owner() {
        let owner = AgentId::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let session = build(
            SessionBuilder::new(RequestKind::Upgrade, PieceId::new()).trigger(Trigger::new(
                Region::Board,
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            )),
            owner,
        );

        assert!(!session.click(AgentId::new(), Region::Board, Vec3::default()));
        assert!(session.click(owner, Region::Board, Vec3::default()));
        assert!(!session.click(owner, Region::Zone(crate::ZoneId::new()), Vec3::default()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disposed_session_ignores_input() {
        let owner = AgentId::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let session = build(
            SessionBuilder::new(RequestKind::Betting, PieceId::new())
                .trigger(Trigger::new(Region::Board, |hit| {
                    hit.session.dispose(DisposeReason::Answered);
                }))
                .on_text(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            owner,
        );

        assert!(session.click(owner, Region::Board, Vec3::default()));
        assert!(session.is_disposed());
        assert!(!session.click(owner, Region::Board, Vec3::default()));
        assert!(!session.submit_text(owner, "5"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(session.render().is_none());
        assert!(!session.dispose(DisposeReason::Cleared));
    }

    #[tokio::test]
    async fn test_render_evaluates_labels_each_time() {
        let owner = AgentId::new();
        let count = Arc::new(AtomicUsize::new(0));
        let shown = count.clone();
        let session = build(
            SessionBuilder::new(RequestKind::Seizure, PieceId::new())
                .message("pick")
                .action_message(move || format!("picked {}", shown.load(Ordering::SeqCst)))
                .trigger(Trigger::new(Region::Board, |_| {}).display("sale amount: 5")),
            owner,
        );

        let first = session.render().unwrap();
        assert_eq!(first.action_message.as_deref(), Some("picked 0"));
        assert_eq!(first.triggers[0].display.as_deref(), Some("sale amount: 5"));
        assert!(!first.accepts_text);

        count.store(2, Ordering::SeqCst);
        let second = session.render().unwrap();
        assert_eq!(second.action_message.as_deref(), Some("picked 2"));
    }

    #[test]
    fn test_dispose_waits_for_running_callback() {
        for _ in 0..200 {
            let owner = AgentId::new();
            let late = Arc::new(AtomicUsize::new(0));
            let seen = late.clone();
            let session = build(
                SessionBuilder::new(RequestKind::Dice, PieceId::new()).trigger(Trigger::new(
                    Region::Board,
                    move |hit| {
                        if hit.session.is_disposed() {
                            seen.fetch_add(1, Ordering::SeqCst);
                        }
                        std::thread::yield_now();
                        if hit.session.is_disposed() {
                            seen.fetch_add(1, Ordering::SeqCst);
                        }
                    },
                )),
                owner,
            );

            let barrier = Arc::new(Barrier::new(2));
            let disposer = {
                let session = session.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    session.dispose(DisposeReason::Cleared);
                })
            };
            barrier.wait();
            session.click(owner, Region::Board, Vec3::default());
            disposer.join().unwrap();

            assert!(session.is_disposed());
            assert_eq!(late.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_runs_fallback_then_disposes() {
        let owner = AgentId::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let session = build(
            SessionBuilder::new(RequestKind::TargetZone, PieceId::new()).timeout(
                "portal",
                Duration::from_secs(10),
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ),
            owner,
        );

        assert_eq!(session.render().unwrap().timeout.unwrap().label, "portal");
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(session.is_disposed());
    }
}
