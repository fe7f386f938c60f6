//! Zone and piece targeting: one trigger per candidate, default on timeout

use async_trait::async_trait;

use super::mismatched;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::gate::response_gate;
use crate::requests::{DialogRequest, DialogResponse, RequestKind, TargetPieceRequest, TargetZoneRequest};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{GameMessage, PieceId, Region, ZoneId};

/// Built-in zone targeting handler
pub struct TargetZoneHandler;

#[async_trait]
impl RequestHandler for TargetZoneHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::TargetZone(request) = request else {
            return Err(mismatched(RequestKind::TargetZone, actual));
        };
        target_zone(dispatcher, request).await.map(DialogResponse::TargetZone)
    }
}

/// Built-in piece targeting handler
pub struct TargetPieceHandler;

#[async_trait]
impl RequestHandler for TargetPieceHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::TargetPiece(request) = request else {
            return Err(mismatched(RequestKind::TargetPiece, actual));
        };
        target_piece(dispatcher, request).await.map(DialogResponse::TargetPiece)
    }
}

struct Candidate<T> {
    region: Region,
    name: String,
    value: T,
}

/// Ask the piece to click one of the candidate zones
pub async fn target_zone(dispatcher: &Dispatcher, request: TargetZoneRequest) -> DialogResult<ZoneId> {
    let candidates = request
        .candidates
        .into_iter()
        .map(|zone| Candidate {
            region: Region::Zone(zone.id),
            name: zone.name,
            value: zone.id,
        })
        .collect();
    pick(
        dispatcher,
        RequestKind::TargetZone,
        request.piece.id,
        request.message,
        candidates,
        request.default,
    )
    .await
}

/// Ask the piece to click one of the candidate pieces
pub async fn target_piece(
    dispatcher: &Dispatcher,
    request: TargetPieceRequest,
) -> DialogResult<PieceId> {
    let candidates = request
        .candidates
        .into_iter()
        .map(|piece| Candidate {
            region: Region::Piece(piece.id),
            name: piece.name,
            value: piece.id,
        })
        .collect();
    pick(
        dispatcher,
        RequestKind::TargetPiece,
        request.piece.id,
        request.message,
        candidates,
        request.default,
    )
    .await
}

async fn pick<T>(
    dispatcher: &Dispatcher,
    kind: RequestKind,
    piece: PieceId,
    message: GameMessage,
    candidates: Vec<Candidate<T>>,
    default: T,
) -> DialogResult<T>
where
    T: Copy + Send + Sync + 'static,
{
    if candidates.is_empty() {
        return Err(DialogError::invalid(kind, "no candidates to choose from"));
    }

    let (tx, gate) = response_gate();
    let mut builder = SessionBuilder::new(kind, piece).message(message.prompt());
    for candidate in candidates {
        let tx = tx.clone();
        let value = candidate.value;
        let name = candidate.name;
        builder = builder.trigger(
            Trigger::new(candidate.region, move |hit| {
                tx.send(value);
                hit.session.dispose(DisposeReason::Answered);
            })
            .label(move || name.clone()),
        );
    }

    dispatcher.open(builder.timeout(message.label(), dispatcher.config().target_timeout(), move |_| {
        tx.send(default);
    }));

    gate.receive().await.ok_or(DialogError::Superseded { kind })
}
