//! Betting dialog: type an amount, or click the board to pass

use async_trait::async_trait;
use tracing::debug;

use super::mismatched;
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::gate::response_gate;
use crate::requests::{BettingRequest, DialogRequest, DialogResponse, RequestKind};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{GameMessage, Region};

/// Built-in betting handler
pub struct BettingHandler;

#[async_trait]
impl RequestHandler for BettingHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Betting(request) = request else {
            return Err(mismatched(RequestKind::Betting, actual));
        };
        place_bet(dispatcher, request).await.map(DialogResponse::Betting)
    }
}

/// Parse a typed bet and clamp it into `[1, max]`; `None` for non-numeric text
pub fn parse_bet(text: &str, max: i64) -> Option<i64> {
    text.trim().parse::<i64>().ok().map(|value| value.clamp(1, max))
}

/// Run the betting dialog; `0` means the piece did not bet
pub async fn place_bet(dispatcher: &Dispatcher, request: BettingRequest) -> DialogResult<i64> {
    let max = request.max;
    if max < 1 {
        return Err(DialogError::invalid(
            RequestKind::Betting,
            format!("bet ceiling {max} is below 1"),
        ));
    }

    let (text_tx, gate) = response_gate();
    let cancel_tx = text_tx.clone();
    let timeout_tx = text_tx.clone();

    dispatcher.open(
        SessionBuilder::new(RequestKind::Betting, request.piece.id)
            .message(GameMessage::Betting.prompt())
            .action_message(move || format!("max amount to bet: {max}"))
            .on_text(move |submission| match parse_bet(submission.text, max) {
                Some(amount) => {
                    text_tx.send(amount);
                    submission.session.dispose(DisposeReason::Answered);
                }
                None => {
                    debug!(target: DIALOG_TARGET, text = submission.text, "ignoring non-numeric bet");
                }
            })
            .trigger(
                Trigger::new(Region::Board, move |hit| {
                    cancel_tx.send(0);
                    hit.session.dispose(DisposeReason::Answered);
                })
                .label(|| "cancel".to_string()),
            )
            .timeout(GameMessage::Betting.label(), dispatcher.config().betting_timeout(), move |_| {
                timeout_tx.send(0);
            }),
    );

    gate.receive().await.ok_or(DialogError::Superseded {
        kind: RequestKind::Betting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bet_clamps() {
        assert_eq!(parse_bet("0", 10), Some(1));
        assert_eq!(parse_bet("999", 10), Some(10));
        assert_eq!(parse_bet(" 7 ", 10), Some(7));
        assert_eq!(parse_bet("-3", 10), Some(1));
    }

    #[test]
    fn test_parse_bet_rejects_text() {
        assert_eq!(parse_bet("abc", 10), None);
        assert_eq!(parse_bet("", 10), None);
        assert_eq!(parse_bet("4.5", 10), None);
    }
}
