//! Confirm, betting and targeting dialogs

mod common;

use std::time::Duration;

use board_dialog::{
    AcquisitionRequest, AgentId, BettingRequest, DialogError, GameMessage, PieceId, PieceRef,
    PropertyLevel, Region, TargetPieceRequest, TargetZoneRequest, UpgradeRequest,
};
use common::{Table, property, settle, zone};
use tokio::time::Instant;
use tokio_test::{assert_pending, assert_ready, task};

fn upgrade(table: &Table, level: u8) -> UpgradeRequest {
    UpgradeRequest {
        piece: table.piece.clone(),
        property: property("seoul", 500),
        level: PropertyLevel {
            value: level,
            costs: 120,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn test_upgrade_confirmed_on_property_click() {
    let table = Table::new();
    let req = upgrade(&table, 3);
    let land = req.property.zone;
    let dispatcher = table.dispatcher.clone();
    let pending = tokio::spawn(async move { dispatcher.confirm_upgrade(req).await });
    settle().await;

    let view = table.dispatcher.render().unwrap();
    assert_eq!(view.action_message.as_deref(), Some("hotel build cost: 120"));
    assert_eq!(view.timeout.unwrap().label, "upgrade land");

    assert!(table.click(Region::Zone(land)));
    // the session is gone, the cancel trigger no longer answers
    assert!(!table.click(Region::Board));
    assert!(pending.await.unwrap().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_upgrade_times_out_to_false() {
    let table = Table::new();
    let started = Instant::now();

    let confirmed = table.dispatcher.confirm_upgrade(upgrade(&table, 0)).await.unwrap();

    assert!(!confirmed);
    assert!(started.elapsed() >= Duration::from_secs(15));
}

#[tokio::test]
async fn test_unknown_level_is_fatal() {
    let table = Table::new();
    let err = table
        .dispatcher
        .confirm_upgrade(upgrade(&table, 7))
        .await
        .unwrap_err();
    assert!(matches!(err, DialogError::UnknownPropertyLevel(7)));
    assert!(err.is_fatal());
    assert!(table.dispatcher.current().is_none());
}

#[tokio::test]
async fn test_absent_agent_declines_without_session() {
    let table = Table::new();
    table.world.leave(table.piece.id);
    let mut events = table.dispatcher.subscribe();

    assert!(!table.dispatcher.confirm_upgrade(upgrade(&table, 1)).await.unwrap());
    let acquired = table
        .dispatcher
        .confirm_acquisition(AcquisitionRequest {
            piece: table.piece.clone(),
            property: property("tokyo", 100),
            costs: 80,
        })
        .await
        .unwrap();
    assert!(!acquired);

    // only the two resolutions, no session was ever opened
    let mut count = 0;
    while let Ok(event) = events.try_recv() {
        assert!(matches!(event, board_dialog::DialogEvent::DialogResolved(_)));
        count += 1;
    }
    assert_eq!(count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_acquisition_cancel_and_timeout() {
    let table = Table::new();
    let req = AcquisitionRequest {
        piece: table.piece.clone(),
        property: property("paris", 100),
        costs: 80,
    };

    let dispatcher = table.dispatcher.clone();
    let cancelled = req.clone();
    let pending = tokio::spawn(async move { dispatcher.confirm_acquisition(cancelled).await });
    settle().await;
    table.click(Region::Board);
    assert!(!pending.await.unwrap().unwrap());

    let started = Instant::now();
    assert!(!table.dispatcher.confirm_acquisition(req).await.unwrap());
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(10) && waited < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_bet_ignores_text_until_numeric() {
    let table = Table::new();
    let mut bet = task::spawn(table.dispatcher.place_bet(BettingRequest {
        piece: table.piece.clone(),
        max: 100,
    }));
    assert_pending!(bet.poll());

    let view = table.dispatcher.render().unwrap();
    assert!(view.accepts_text);
    assert_eq!(view.action_message.as_deref(), Some("max amount to bet: 100"));

    assert!(table.type_text("abc"));
    assert_pending!(bet.poll());
    assert!(!table.dispatcher.submit_text(AgentId::new(), "5"));
    assert_pending!(bet.poll());

    assert!(table.type_text(" 999 "));
    let amount = assert_ready!(bet.poll()).unwrap();
    assert_eq!(amount, 100);
}

#[tokio::test(start_paused = true)]
async fn test_bet_floor_is_one() {
    let table = Table::new();
    let mut bet = task::spawn(table.dispatcher.place_bet(BettingRequest {
        piece: table.piece.clone(),
        max: 100,
    }));
    assert_pending!(bet.poll());

    table.type_text("0");
    assert_eq!(assert_ready!(bet.poll()).unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bet_cancel_and_timeout_yield_zero() {
    let table = Table::new();
    let req = BettingRequest {
        piece: table.piece.clone(),
        max: 30,
    };

    let dispatcher = table.dispatcher.clone();
    let cancelled = req.clone();
    let pending = tokio::spawn(async move { dispatcher.place_bet(cancelled).await });
    settle().await;
    table.click(Region::Board);
    assert_eq!(pending.await.unwrap().unwrap(), 0);

    let started = Instant::now();
    assert_eq!(table.dispatcher.place_bet(req).await.unwrap(), 0);
    assert!(started.elapsed() >= Duration::from_secs(15));
}

#[tokio::test]
async fn test_bet_ceiling_below_one_rejected() {
    let table = Table::new();
    let err = table
        .dispatcher
        .place_bet(BettingRequest {
            piece: table.piece.clone(),
            max: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DialogError::InvalidRequest { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_zone_target_click_and_default() {
    let table = Table::new();
    let (tokyo, paris, rome) = (zone("tokyo"), zone("paris"), zone("rome"));
    let req = TargetZoneRequest {
        piece: table.piece.clone(),
        message: GameMessage::ZoneForPortal,
        candidates: vec![tokyo.clone(), paris.clone()],
        default: paris.id,
    };

    let dispatcher = table.dispatcher.clone();
    let clicked = req.clone();
    let pending = tokio::spawn(async move { dispatcher.target_zone(clicked).await });
    settle().await;
    let view = table.dispatcher.render().unwrap();
    assert_eq!(view.message, "click a place that you will move to");
    let labels: Vec<_> = view.triggers.iter().filter_map(|t| t.label.clone()).collect();
    assert_eq!(labels, ["tokyo", "paris"]);

    // not a candidate
    assert!(!table.click(Region::Zone(rome.id)));
    assert!(table.click(Region::Zone(tokyo.id)));
    assert_eq!(pending.await.unwrap().unwrap(), tokyo.id);

    let started = Instant::now();
    assert_eq!(table.dispatcher.target_zone(req).await.unwrap(), paris.id);
    assert!(started.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_piece_target() {
    let table = Table::new();
    let bob = PieceRef {
        id: PieceId::new(),
        name: "bob".to_string(),
    };
    let carol = PieceRef {
        id: PieceId::new(),
        name: "carol".to_string(),
    };
    let req = TargetPieceRequest {
        piece: table.piece.clone(),
        message: GameMessage::PieceForPush,
        candidates: vec![bob.clone(), carol.clone()],
        default: bob.id,
    };

    let dispatcher = table.dispatcher.clone();
    let pending = tokio::spawn(async move { dispatcher.target_piece(req).await });
    settle().await;
    assert_eq!(table.dispatcher.render().unwrap().timeout.unwrap().label, "choose person");

    table.click(Region::Piece(carol.id));
    assert_eq!(pending.await.unwrap().unwrap(), carol.id);
}

#[tokio::test(start_paused = true)]
async fn test_piece_target_times_out_to_default() {
    let table = Table::new();
    let bob = PieceRef {
        id: PieceId::new(),
        name: "bob".to_string(),
    };
    let started = Instant::now();

    let chosen = table
        .dispatcher
        .target_piece(TargetPieceRequest {
            piece: table.piece.clone(),
            message: GameMessage::PieceForGiftProperty,
            candidates: vec![bob.clone()],
            default: bob.id,
        })
        .await
        .unwrap();

    assert_eq!(chosen, bob.id);
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(table.dispatcher.current().is_none());
}

#[tokio::test]
async fn test_empty_candidates_rejected() {
    let table = Table::new();
    let err = table
        .dispatcher
        .target_zone(TargetZoneRequest {
            piece: table.piece.clone(),
            message: GameMessage::ZoneForEarthquake,
            candidates: Vec::new(),
            default: zone("nowhere").id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DialogError::InvalidRequest { .. }));
}
