//! Shared table setup for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use board_dialog::{
    AgentId, DialogConfig, Dispatcher, HandlerTable, PieceId, PieceRef, PropertyRef, Region,
    RecordingWorld, Vec3, ZoneId, ZoneRef,
};

pub const SEED: u64 = 7;

/// Where the acting agent stands
pub const SEAT: Vec3 = Vec3::new(10.0, 0.0, 0.0);

/// Direction every scripted click aims at
pub const AIM: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// One seated piece at a recording board
pub struct Table {
    pub world: Arc<RecordingWorld>,
    pub dispatcher: Dispatcher,
    pub piece: PieceRef,
    pub agent: AgentId,
}

impl Table {
    pub fn new() -> Self {
        Self::with_config(DialogConfig::default())
    }

    pub fn with_config(config: DialogConfig) -> Self {
        let world = Arc::new(RecordingWorld::new());
        let piece = PieceRef {
            id: PieceId::new(),
            name: "alice".to_string(),
        };
        let agent = AgentId::new();
        world.seat(piece.id, agent, SEAT);

        let dispatcher = Dispatcher::with_seed(world.clone(), config, SEED);
        dispatcher.register(HandlerTable::standard());

        Self {
            world,
            dispatcher,
            piece,
            agent,
        }
    }

    /// Click as the seated agent
    pub fn click(&self, region: Region) -> bool {
        self.dispatcher.click(self.agent, region, AIM)
    }

    /// Type as the seated agent
    pub fn type_text(&self, text: &str) -> bool {
        self.dispatcher.submit_text(self.agent, text)
    }
}

/// Let spawned handlers run up to their first suspension point
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn zone(name: &str) -> ZoneRef {
    ZoneRef {
        id: ZoneId::new(),
        name: name.to_string(),
    }
}

pub fn property(name: &str, assets: i64) -> PropertyRef {
    PropertyRef {
        zone: ZoneId::new(),
        name: name.to_string(),
        assets,
    }
}

/// Optional log output while debugging a test: `RUST_LOG` is not consulted,
/// everything at debug and above is printed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
