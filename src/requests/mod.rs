//! Typed dialog requests issued by the game engine and their answers
//!
//! `DialogRequest` is a closed union: adding a kind means adding a variant
//! here, a [`RequestKind`], and a handler binding, all checked by the
//! compiler through exhaustive matches.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::{
    GameMessage, Magic, PieceId, PieceRef, PropertyLevel, PropertyRef, ZoneId, ZoneRef,
};

/// Discriminant of [`DialogRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestKind {
    Dice,
    Upgrade,
    Acquisition,
    Seizure,
    Betting,
    Tax,
    TargetZone,
    TargetPiece,
    Magic,
}

impl RequestKind {
    pub const ALL: [RequestKind; 9] = [
        Self::Dice,
        Self::Upgrade,
        Self::Acquisition,
        Self::Seizure,
        Self::Betting,
        Self::Tax,
        Self::TargetZone,
        Self::TargetPiece,
        Self::Magic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dice => "dice",
            Self::Upgrade => "upgrade",
            Self::Acquisition => "acquisition",
            Self::Seizure => "seizure",
            Self::Betting => "betting",
            Self::Tax => "tax",
            Self::TargetZone => "target-zone",
            Self::TargetPiece => "target-piece",
            Self::Magic => "magic",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roll `count` dice for `piece`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRequest {
    pub piece: PieceRef,
    /// Plain, fate or moonwalk roll; only the plain roll reports doubles
    pub message: GameMessage,
    pub count: usize,
}

/// Confirm building `level` on `property`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRequest {
    pub piece: PieceRef,
    pub property: PropertyRef,
    pub level: PropertyLevel,
}

/// Confirm buying `property` for `costs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    pub piece: PieceRef,
    pub property: PropertyRef,
    pub costs: i64,
}

/// Pick properties to sell until `balance` plus their assets covers `required`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeizureRequest {
    pub piece: PieceRef,
    pub properties: Vec<PropertyRef>,
    /// Money the piece holds before selling anything
    pub balance: i64,
    pub required: i64,
    /// Precomputed selection that alone satisfies `required`
    pub default_selection: Vec<ZoneId>,
}

/// Type a bet between 1 and `max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingRequest {
    pub piece: PieceRef,
    pub max: i64,
}

/// Stop the shrinking tax countdown that starts at `max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRequest {
    pub piece: PieceRef,
    pub zone: ZoneRef,
    pub max: i64,
}

/// Choose one of `candidates` zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetZoneRequest {
    pub piece: PieceRef,
    pub message: GameMessage,
    pub candidates: Vec<ZoneRef>,
    pub default: ZoneId,
}

/// Choose one of `candidates` pieces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPieceRequest {
    pub piece: PieceRef,
    pub message: GameMessage,
    pub candidates: Vec<PieceRef>,
    pub default: PieceId,
}

/// Spin the magic slot machine over `magics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicRequest {
    pub piece: PieceRef,
    pub magics: BTreeSet<Magic>,
}

/// A decision the engine needs from the acting party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DialogRequest {
    Dice(DiceRequest),
    Upgrade(UpgradeRequest),
    Acquisition(AcquisitionRequest),
    Seizure(SeizureRequest),
    Betting(BettingRequest),
    Tax(TaxRequest),
    TargetZone(TargetZoneRequest),
    TargetPiece(TargetPieceRequest),
    Magic(MagicRequest),
}

impl DialogRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Dice(_) => RequestKind::Dice,
            Self::Upgrade(_) => RequestKind::Upgrade,
            Self::Acquisition(_) => RequestKind::Acquisition,
            Self::Seizure(_) => RequestKind::Seizure,
            Self::Betting(_) => RequestKind::Betting,
            Self::Tax(_) => RequestKind::Tax,
            Self::TargetZone(_) => RequestKind::TargetZone,
            Self::TargetPiece(_) => RequestKind::TargetPiece,
            Self::Magic(_) => RequestKind::Magic,
        }
    }

    /// The acting piece
    pub fn piece(&self) -> &PieceRef {
        match self {
            Self::Dice(r) => &r.piece,
            Self::Upgrade(r) => &r.piece,
            Self::Acquisition(r) => &r.piece,
            Self::Seizure(r) => &r.piece,
            Self::Betting(r) => &r.piece,
            Self::Tax(r) => &r.piece,
            Self::TargetZone(r) => &r.piece,
            Self::TargetPiece(r) => &r.piece,
            Self::Magic(r) => &r.piece,
        }
    }

    /// Prompt variant the request is presented with
    pub fn message(&self) -> GameMessage {
        match self {
            Self::Dice(r) => r.message,
            Self::Upgrade(_) => GameMessage::Upgrade,
            Self::Acquisition(_) => GameMessage::Acquisition,
            Self::Seizure(_) => GameMessage::Seizure,
            Self::Betting(_) => GameMessage::Betting,
            Self::Tax(_) => GameMessage::Tax,
            Self::TargetZone(r) => r.message,
            Self::TargetPiece(r) => r.message,
            Self::Magic(_) => GameMessage::Magic,
        }
    }
}

/// Answer handed back to the engine; one variant per request kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DialogResponse {
    /// Face values in die order
    Dice(Vec<u8>),
    Upgrade(bool),
    Acquisition(bool),
    /// Zones of the properties to sell
    Seizure(Vec<ZoneId>),
    /// Bet amount, `0` when declined
    Betting(i64),
    Tax(i64),
    TargetZone(ZoneId),
    TargetPiece(PieceId),
    Magic(Magic),
}

impl DialogResponse {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Dice(_) => RequestKind::Dice,
            Self::Upgrade(_) => RequestKind::Upgrade,
            Self::Acquisition(_) => RequestKind::Acquisition,
            Self::Seizure(_) => RequestKind::Seizure,
            Self::Betting(_) => RequestKind::Betting,
            Self::Tax(_) => RequestKind::Tax,
            Self::TargetZone(_) => RequestKind::TargetZone,
            Self::TargetPiece(_) => RequestKind::TargetPiece,
            Self::Magic(_) => RequestKind::Magic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let piece = PieceRef {
            id: PieceId::new(),
            name: "red".to_string(),
        };
        let request = DialogRequest::Betting(BettingRequest {
            piece: piece.clone(),
            max: 10,
        });
        assert_eq!(request.kind(), RequestKind::Betting);
        assert_eq!(request.message(), GameMessage::Betting);
        assert_eq!(request.piece(), &piece);
        assert_eq!(DialogResponse::Betting(3).kind(), RequestKind::Betting);
    }

    #[test]
    fn test_kind_names_are_unique() {
        let names: BTreeSet<_> = RequestKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), RequestKind::ALL.len());
    }
}
