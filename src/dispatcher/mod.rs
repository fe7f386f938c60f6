//! The dialog dispatcher
//!
//! Owns the single session slot, the handler table, the world collaborator,
//! the configuration and the random source. Installing a session always
//! disposes the previous one first; that ordering is the whole mutual
//! exclusion story, no other lock guards the dialogs.

mod table;

pub use table::{HandlerTable, RequestHandler};

use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::DIALOG_TARGET;
use crate::config::DialogConfig;
use crate::errors::{DialogError, DialogResult};
use crate::events::{DialogEvent, DialogResolved, DisposeReason, SessionOpened};
use crate::requests::*;
use crate::session::{DialogSession, SessionBuilder, SessionView};
use crate::value_objects::{AgentId, Magic, PieceId, Region, Vec3, ZoneId};
use crate::world::World;

const EVENT_CAPACITY: usize = 256;

/// Routes engine requests to handlers and user input to the live session
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    world: Arc<dyn World>,
    config: DialogConfig,
    rng: Mutex<StdRng>,
    slot: Mutex<Option<Arc<DialogSession>>>,
    handlers: RwLock<HandlerTable>,
    events: broadcast::Sender<DialogEvent>,
}

impl Dispatcher {
    /// Dispatcher with no handlers bound and an entropy-seeded random source
    pub fn new(world: Arc<dyn World>, config: DialogConfig) -> Self {
        Self::from_rng(world, config, StdRng::from_entropy())
    }

    /// Dispatcher whose random draws are reproducible
    pub fn with_seed(world: Arc<dyn World>, config: DialogConfig, seed: u64) -> Self {
        Self::from_rng(world, config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(world: Arc<dyn World>, config: DialogConfig, rng: StdRng) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                world,
                config,
                rng: Mutex::new(rng),
                slot: Mutex::new(None),
                handlers: RwLock::new(HandlerTable::new()),
                events,
            }),
        }
    }

    /// Dispatcher with every built-in handler bound
    pub fn standard(world: Arc<dyn World>, config: DialogConfig) -> Self {
        let dispatcher = Self::new(world, config);
        dispatcher.register(HandlerTable::standard());
        dispatcher
    }

    /// Replace the handler table
    pub fn register(&self, table: HandlerTable) {
        *self.inner.handlers.write() = table;
    }

    /// Bind or rebind the handler for one request kind
    pub fn bind(&self, kind: RequestKind, handler: Arc<dyn RequestHandler>) {
        self.inner.handlers.write().bind(kind, handler);
    }

    pub fn world(&self) -> &dyn World {
        self.inner.world.as_ref()
    }

    pub fn config(&self) -> &DialogConfig {
        &self.inner.config
    }

    /// Draw from the dispatcher's random source
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        f(&mut self.inner.rng.lock())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DialogEvent> {
        self.inner.events.subscribe()
    }

    /// Run the bound handler for `request` and wait for its answer
    pub async fn dispatch(&self, request: DialogRequest) -> DialogResult<DialogResponse> {
        let kind = request.kind();
        let piece = request.piece().id;
        let handler = self.inner.handlers.read().get(kind);
        let Some(handler) = handler else {
            error!(target: DIALOG_TARGET, %kind, "dispatch without a bound handler");
            return Err(DialogError::UnboundRequest { kind });
        };

        match handler.handle(self, request).await {
            Ok(response) => {
                info!(target: DIALOG_TARGET, %kind, ?response, "dialog resolved");
                let _ = self.inner.events.send(DialogEvent::DialogResolved(DialogResolved {
                    kind,
                    piece,
                    outcome: serde_json::to_value(&response).unwrap_or_default(),
                    resolved_at: Utc::now(),
                }));
                Ok(response)
            }
            Err(err) if err.is_fatal() => {
                error!(target: DIALOG_TARGET, %kind, error = %err, "dialog failed");
                Err(err)
            }
            Err(err) => {
                warn!(target: DIALOG_TARGET, %kind, error = %err, "dialog abandoned");
                Err(err)
            }
        }
    }

    /// Install a new session, disposing the current one first
    pub fn open(&self, builder: SessionBuilder) -> Arc<DialogSession> {
        let mut slot = self.inner.slot.lock();
        if let Some(previous) = slot.take() {
            previous.dispose(DisposeReason::Superseded);
        }

        let piece = builder.piece();
        let owner = self.inner.world.agent_of(piece);
        let session = builder.build(owner, self.inner.events.clone());
        *slot = Some(session.clone());
        drop(slot);

        info!(target: DIALOG_TARGET, session = %session.id(), kind = %session.kind(), owner = ?owner, "session opened");
        session.publish(DialogEvent::SessionOpened(SessionOpened {
            session_id: session.id(),
            piece,
            kind: session.kind(),
            opened_at: Utc::now(),
        }));
        session
    }

    /// The live session, if any
    pub fn current(&self) -> Option<Arc<DialogSession>> {
        self.inner
            .slot
            .lock()
            .as_ref()
            .filter(|s| !s.is_disposed())
            .cloned()
    }

    /// Dispose the live session if there is one
    pub fn dispose_current(&self) {
        let previous = self.inner.slot.lock().take();
        if let Some(session) = previous {
            session.dispose(DisposeReason::Cleared);
        }
    }

    /// Deliver a click from the input layer. Returns whether a trigger fired.
    pub fn click(&self, agent: AgentId, region: Region, aim: Vec3) -> bool {
        match self.current() {
            Some(session) => session.click(agent, region, aim),
            None => false,
        }
    }

    /// Deliver typed text from the input layer
    pub fn submit_text(&self, agent: AgentId, text: &str) -> bool {
        match self.current() {
            Some(session) => session.submit_text(agent, text),
            None => false,
        }
    }

    /// Snapshot of the live session for drawing
    pub fn render(&self) -> Option<SessionView> {
        self.current().and_then(|s| s.render())
    }

    pub async fn roll_dice(&self, request: DiceRequest) -> DialogResult<Vec<u8>> {
        match self.dispatch(DialogRequest::Dice(request)).await? {
            DialogResponse::Dice(values) => Ok(values),
            other => Err(mismatch(RequestKind::Dice, &other)),
        }
    }

    pub async fn confirm_upgrade(&self, request: UpgradeRequest) -> DialogResult<bool> {
        match self.dispatch(DialogRequest::Upgrade(request)).await? {
            DialogResponse::Upgrade(confirmed) => Ok(confirmed),
            other => Err(mismatch(RequestKind::Upgrade, &other)),
        }
    }

    pub async fn confirm_acquisition(&self, request: AcquisitionRequest) -> DialogResult<bool> {
        match self.dispatch(DialogRequest::Acquisition(request)).await? {
            DialogResponse::Acquisition(confirmed) => Ok(confirmed),
            other => Err(mismatch(RequestKind::Acquisition, &other)),
        }
    }

    pub async fn select_seizure(&self, request: SeizureRequest) -> DialogResult<Vec<ZoneId>> {
        match self.dispatch(DialogRequest::Seizure(request)).await? {
            DialogResponse::Seizure(zones) => Ok(zones),
            other => Err(mismatch(RequestKind::Seizure, &other)),
        }
    }

    pub async fn place_bet(&self, request: BettingRequest) -> DialogResult<i64> {
        match self.dispatch(DialogRequest::Betting(request)).await? {
            DialogResponse::Betting(amount) => Ok(amount),
            other => Err(mismatch(RequestKind::Betting, &other)),
        }
    }

    pub async fn collect_tax(&self, request: TaxRequest) -> DialogResult<i64> {
        match self.dispatch(DialogRequest::Tax(request)).await? {
            DialogResponse::Tax(amount) => Ok(amount),
            other => Err(mismatch(RequestKind::Tax, &other)),
        }
    }

    pub async fn target_zone(&self, request: TargetZoneRequest) -> DialogResult<ZoneId> {
        match self.dispatch(DialogRequest::TargetZone(request)).await? {
            DialogResponse::TargetZone(zone) => Ok(zone),
            other => Err(mismatch(RequestKind::TargetZone, &other)),
        }
    }

    pub async fn target_piece(&self, request: TargetPieceRequest) -> DialogResult<PieceId> {
        match self.dispatch(DialogRequest::TargetPiece(request)).await? {
            DialogResponse::TargetPiece(piece) => Ok(piece),
            other => Err(mismatch(RequestKind::TargetPiece, &other)),
        }
    }

    pub async fn draw_magic(&self, request: MagicRequest) -> DialogResult<Magic> {
        match self.dispatch(DialogRequest::Magic(request)).await? {
            DialogResponse::Magic(magic) => Ok(magic),
            other => Err(mismatch(RequestKind::Magic, &other)),
        }
    }
}

fn mismatch(expected: RequestKind, response: &DialogResponse) -> DialogError {
    DialogError::MismatchedRequest {
        expected,
        actual: response.kind(),
    }
}
