//! Upgrade and acquisition dialogs: click the property to confirm, the board
//! to cancel

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::mismatched;
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::gate::response_gate;
use crate::requests::{AcquisitionRequest, DialogRequest, DialogResponse, RequestKind, UpgradeRequest};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{GameMessage, PieceId, Region};

struct ConfirmPrompt {
    kind: RequestKind,
    piece: PieceId,
    message: GameMessage,
    action_message: String,
    confirm_region: Region,
    timeout: Duration,
}

/// Built-in upgrade handler
pub struct UpgradeHandler;

#[async_trait]
impl RequestHandler for UpgradeHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Upgrade(request) = request else {
            return Err(mismatched(RequestKind::Upgrade, actual));
        };
        confirm_upgrade(dispatcher, request).await.map(DialogResponse::Upgrade)
    }
}

/// Built-in acquisition handler
pub struct AcquisitionHandler;

#[async_trait]
impl RequestHandler for AcquisitionHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Acquisition(request) = request else {
            return Err(mismatched(RequestKind::Acquisition, actual));
        };
        confirm_acquisition(dispatcher, request)
            .await
            .map(DialogResponse::Acquisition)
    }
}

/// Ask whether to build the requested level; `false` on cancel, timeout or
/// when nobody is playing the piece
pub async fn confirm_upgrade(dispatcher: &Dispatcher, request: UpgradeRequest) -> DialogResult<bool> {
    let (building, verb) = request
        .level
        .label()
        .ok_or(DialogError::UnknownPropertyLevel(request.level.value))?;

    confirm(
        dispatcher,
        ConfirmPrompt {
            kind: RequestKind::Upgrade,
            piece: request.piece.id,
            message: GameMessage::Upgrade,
            action_message: format!("{building} {verb} cost: {}", request.level.costs),
            confirm_region: Region::Zone(request.property.zone),
            timeout: dispatcher.config().upgrade_timeout(),
        },
    )
    .await
}

/// Ask whether to buy the property; `false` on cancel, timeout or when
/// nobody is playing the piece
pub async fn confirm_acquisition(
    dispatcher: &Dispatcher,
    request: AcquisitionRequest,
) -> DialogResult<bool> {
    confirm(
        dispatcher,
        ConfirmPrompt {
            kind: RequestKind::Acquisition,
            piece: request.piece.id,
            message: GameMessage::Acquisition,
            action_message: format!("cost: {}", request.costs),
            confirm_region: Region::Zone(request.property.zone),
            timeout: dispatcher.config().acquisition_timeout(),
        },
    )
    .await
}

async fn confirm(dispatcher: &Dispatcher, prompt: ConfirmPrompt) -> DialogResult<bool> {
    if dispatcher.world().agent_of(prompt.piece).is_none() {
        info!(target: DIALOG_TARGET, kind = %prompt.kind, "no live agent, declining");
        return Ok(false);
    }

    let (confirm_tx, gate) = response_gate();
    let cancel_tx = confirm_tx.clone();
    let timeout_tx = confirm_tx.clone();
    let action_message = prompt.action_message;

    dispatcher.open(
        SessionBuilder::new(prompt.kind, prompt.piece)
            .message(prompt.message.prompt())
            .action_message(move || action_message.clone())
            .trigger(
                Trigger::new(prompt.confirm_region, move |hit| {
                    confirm_tx.send(true);
                    hit.session.dispose(DisposeReason::Answered);
                })
                .label(|| "confirm".to_string()),
            )
            .trigger(
                Trigger::new(Region::Board, move |hit| {
                    cancel_tx.send(false);
                    hit.session.dispose(DisposeReason::Answered);
                })
                .label(|| "cancel".to_string()),
            )
            .timeout(prompt.message.label(), prompt.timeout, move |_| {
                timeout_tx.send(false);
            }),
    );

    gate.receive()
        .await
        .ok_or(DialogError::Superseded { kind: prompt.kind })
}
