//! Error types for dialog dispatch
//!
//! Timeouts are never errors: every handler maps an expired deadline to its
//! own default answer. What remains here are configuration mistakes made by
//! the engine and the one runtime condition a handler cannot answer for, a
//! session that was replaced before anyone responded.

use std::io;

use thiserror::Error;

use crate::requests::RequestKind;

/// Errors surfaced by the dispatcher and its handlers
#[derive(Debug, Error)]
pub enum DialogError {
    /// No handler is bound for this request kind.
    #[error("no handler bound for {kind} requests")]
    UnboundRequest { kind: RequestKind },

    /// Upgrade requested for a level index outside 0..=4.
    #[error("unknown property level {0}")]
    UnknownPropertyLevel(u8),

    /// Request payload cannot be presented (no dice, no candidates, ...).
    #[error("invalid {kind} request: {reason}")]
    InvalidRequest { kind: RequestKind, reason: String },

    /// A newer dialog disposed this one before it produced an answer.
    #[error("{kind} dialog was superseded before it was answered")]
    Superseded { kind: RequestKind },

    /// Handler bound for one kind received another.
    #[error("handler for {expected} received a {actual} request")]
    MismatchedRequest {
        expected: RequestKind,
        actual: RequestKind,
    },

    /// Configuration file could not be read.
    #[error("failed to read dialog config: {0}")]
    ConfigIo(#[from] io::Error),

    /// Configuration file is not valid JSON for `DialogConfig`.
    #[error("failed to parse dialog config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl DialogError {
    pub(crate) fn invalid(kind: RequestKind, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            kind,
            reason: reason.into(),
        }
    }

    /// Configuration errors abort the engine operation; only `Superseded`
    /// is an expected runtime outcome.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Superseded { .. })
    }
}

/// Result alias used across the crate
pub type DialogResult<T> = Result<T, DialogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superseded_is_not_fatal() {
        let err = DialogError::Superseded {
            kind: RequestKind::Betting,
        };
        assert!(!err.is_fatal());
        assert!(DialogError::UnknownPropertyLevel(7).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = DialogError::UnboundRequest {
            kind: RequestKind::Magic,
        };
        assert_eq!(err.to_string(), "no handler bound for magic requests");

        let err = DialogError::invalid(RequestKind::Dice, "zero dice");
        assert_eq!(err.to_string(), "invalid dice request: zero dice");
    }
}
