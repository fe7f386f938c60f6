//! Scripted Turn Example
//!
//! This example demonstrates how to:
//! - Wire a dispatcher to a world implementation
//! - Answer dialogs from a separate input task
//! - Let timeouts and the tax countdown resolve on their own
//! - Follow the lifecycle events with the activity projection

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use board_dialog::{
    AcquisitionRequest, AgentId, BettingRequest, DialogActivity, DialogConfig, DiceRequest,
    Dispatcher, GameMessage, HandlerTable, Magic, MagicRequest, PieceId, PieceRef, PropertyLevel,
    PropertyRef, RecordingWorld, Region, SeizureRequest, TargetPieceRequest, TargetZoneRequest,
    TaxRequest, UpgradeRequest, Vec3, ZoneId, ZoneRef,
};

/// Click or type for `agent` once the next dialog of the turn is on screen
async fn answer(dispatcher: &Dispatcher, agent: AgentId, input: Input) {
    loop {
        tokio::time::sleep(Duration::from_millis(300)).await;
        if dispatcher.current().is_some() {
            break;
        }
    }
    if let Some(view) = dispatcher.render() {
        println!("   [{}] {}", view.kind, view.message);
        if let Some(action) = view.action_message {
            println!("   [{}] {}", view.kind, action);
        }
    }
    match input {
        Input::Click(region) => {
            dispatcher.click(agent, region, Vec3::new(0.0, 0.0, 1.0));
        }
        Input::Text(text) => {
            dispatcher.submit_text(agent, text);
        }
        Input::Wait => {}
    }
}

enum Input {
    Click(Region),
    Text(&'static str),
    Wait,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Board Dialog Example ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => DialogConfig::load(path)?,
        None => DialogConfig {
            tick_ms: 20,
            seizure_timeout_ms: 3_000,
            ..DialogConfig::default()
        },
    };

    let world = Arc::new(RecordingWorld::new());
    let dispatcher = Dispatcher::with_seed(world.clone(), config, 2024);
    dispatcher.register(HandlerTable::standard());

    let events = dispatcher.subscribe();
    let follower = tokio::spawn(async move {
        let mut activity = DialogActivity::new();
        activity.follow(events).await;
        activity
    });

    let alice = PieceRef {
        id: PieceId::new(),
        name: "alice".to_string(),
    };
    let bob = PieceRef {
        id: PieceId::new(),
        name: "bob".to_string(),
    };
    let agent = AgentId::new();
    world.seat(alice.id, agent, Vec3::new(4.0, 0.0, 4.0));
    world.script_faces([3, 3]);

    let seoul = PropertyRef {
        zone: ZoneId::new(),
        name: "seoul".to_string(),
        assets: 180,
    };
    let tokyo = ZoneRef {
        id: ZoneId::new(),
        name: "tokyo".to_string(),
    };

    println!("1. Rolling the dice...");
    let (values, _) = tokio::join!(
        dispatcher.roll_dice(DiceRequest {
            piece: alice.clone(),
            message: GameMessage::RollTheDice,
            count: 2,
        }),
        answer(&dispatcher, agent, Input::Click(Region::Board)),
    );
    println!("   rolled {:?}\n", values?);

    println!("2. Buying and upgrading a land...");
    let (bought, _) = tokio::join!(
        dispatcher.confirm_acquisition(AcquisitionRequest {
            piece: alice.clone(),
            property: seoul.clone(),
            costs: 200,
        }),
        answer(&dispatcher, agent, Input::Click(Region::Zone(seoul.zone))),
    );
    let (upgraded, _) = tokio::join!(
        dispatcher.confirm_upgrade(UpgradeRequest {
            piece: alice.clone(),
            property: seoul.clone(),
            level: PropertyLevel { value: 1, costs: 150 },
        }),
        answer(&dispatcher, agent, Input::Click(Region::Board)),
    );
    println!("   bought: {}, upgraded: {}\n", bought?, upgraded?);

    println!("3. Betting...");
    let (bet, _) = tokio::join!(
        dispatcher.place_bet(BettingRequest {
            piece: alice.clone(),
            max: 500,
        }),
        answer(&dispatcher, agent, Input::Text("250")),
    );
    println!("   bet {}\n", bet?);

    println!("4. Paying tax...");
    let (paid, _) = tokio::join!(
        dispatcher.collect_tax(TaxRequest {
            piece: alice.clone(),
            zone: ZoneRef {
                id: ZoneId::new(),
                name: "revenue".to_string(),
            },
            max: 120,
        }),
        answer(&dispatcher, agent, Input::Wait),
    );
    println!("   paid {}\n", paid?);

    println!("5. Targeting...");
    let (portal, _) = tokio::join!(
        dispatcher.target_zone(TargetZoneRequest {
            piece: alice.clone(),
            message: GameMessage::ZoneForPortal,
            candidates: vec![tokyo.clone()],
            default: tokyo.id,
        }),
        answer(&dispatcher, agent, Input::Click(Region::Zone(tokyo.id))),
    );
    let (pushed, _) = tokio::join!(
        dispatcher.target_piece(TargetPieceRequest {
            piece: alice.clone(),
            message: GameMessage::PieceForPush,
            candidates: vec![bob.clone()],
            default: bob.id,
        }),
        answer(&dispatcher, agent, Input::Click(Region::Piece(bob.id))),
    );
    println!("   portal to {:?}, pushed {:?}\n", portal?, pushed?);

    println!("6. Drawing magic...");
    let (drawn, _) = tokio::join!(
        dispatcher.draw_magic(MagicRequest {
            piece: alice.clone(),
            magics: BTreeSet::from([Magic::Angel, Magic::Storm, Magic::TripleDice]),
        }),
        answer(&dispatcher, agent, Input::Click(Region::Board)),
    );
    println!("   drew {:?}\n", drawn?.info());

    println!("7. Selling land to cover a debt (left to the timeout)...");
    let sold = dispatcher
        .select_seizure(SeizureRequest {
            piece: alice.clone(),
            properties: vec![seoul.clone()],
            balance: 0,
            required: 100,
            default_selection: vec![seoul.zone],
        })
        .await?;
    println!("   sold {sold:?}\n");

    // the event stream closes with the dispatcher
    drop(dispatcher);
    let activity = follower.await?;
    println!("=== Activity ===");
    println!("opened: {}, timeouts: {}", activity.opened, activity.timeouts);
    for announcement in world.announcements().iter().rev().take(3) {
        println!("title: {} / {}", announcement.title, announcement.subtitle);
    }

    Ok(())
}
