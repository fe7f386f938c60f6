//! Value objects for the board dialog domain

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a game piece (a seat at the board)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceId(pub Uuid);

impl PieceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PieceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a board zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub Uuid);

impl ZoneId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a live interacting party (the player behind a piece)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of one dialog session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clickable area of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Neutral center of the board
    Board,
    /// The box around a zone
    Zone(ZoneId),
    /// The bounding box around a piece's stand
    Piece(PieceId),
}

/// Plain 3D vector used for positions and impulses
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Vec3) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 { self } else { self.scale(1.0 / len) }
    }

    /// Rotate around the vertical axis by `radians`
    pub fn rotate_around_y(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos * self.x + sin * self.z, self.y, -sin * self.x + cos * self.z)
    }
}

/// Which decision the engine is asking for; selects prompt text and some
/// handler policies (only `RollTheDice` can produce a double)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMessage {
    RollTheDice,
    Acquisition,
    Upgrade,
    Seizure,
    Betting,
    RollTheDiceForGamble,
    ZoneForPortal,
    Tax,
    PieceForPush,
    ZoneForOverprice,
    PieceForGiftProperty,
    ZoneForGiftProperty,
    RollTheDiceForMoonwalk,
    ZoneForEarthquake,
    Magic,
}

impl GameMessage {
    /// Prompt shown while the dialog is open
    pub fn prompt(self) -> &'static str {
        match self {
            Self::RollTheDice => "click the board to roll the dice",
            Self::Acquisition => "click the land to buy it",
            Self::Upgrade => "click the land to upgrade",
            Self::Seizure => "click which land to sell",
            Self::Betting => "type the number that you will bet",
            Self::RollTheDiceForGamble => "click the board to roll the dice of fate",
            Self::ZoneForPortal => "click a place that you will move to",
            Self::Tax => "click the revenue to choose the tax you will pay",
            Self::PieceForPush => "choose a person that you will push",
            Self::ZoneForOverprice => "choose your land for overprice",
            Self::PieceForGiftProperty => "choose a person to gift",
            Self::ZoneForGiftProperty => "choose a land to gift",
            Self::RollTheDiceForMoonwalk => "click the board to roll the moonwalk dice",
            Self::ZoneForEarthquake => "choose the land that will be attacked by an earthquake",
            Self::Magic => "click the land to choose the magic",
        }
    }

    /// Short label used for the timeout countdown
    pub fn label(self) -> &'static str {
        match self {
            Self::RollTheDice => "dice",
            Self::Acquisition => "buy",
            Self::Upgrade => "upgrade land",
            Self::Seizure => "sell land",
            Self::Betting => "money bet",
            Self::RollTheDiceForGamble => "dice of fate",
            Self::ZoneForPortal => "portal",
            Self::Tax => "revenue",
            Self::PieceForPush | Self::PieceForGiftProperty => "choose person",
            Self::ZoneForOverprice | Self::ZoneForEarthquake => "choose land",
            Self::ZoneForGiftProperty => "choose own land",
            Self::RollTheDiceForMoonwalk => "moonwalk dice",
            Self::Magic => "magic",
        }
    }
}

/// Magic effects a piece can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Magic {
    Angel,
    Arrest,
    Earthquake,
    GiftProperty,
    Moonwalk,
    MoveToSeoul,
    MoveToStart,
    Overprice,
    Pickpocket,
    Punishment,
    Push,
    QuadrupleDice,
    SingleDice,
    Storm,
    TripleDice,
}

impl Magic {
    /// `(name, description)` announced by the magic dialog
    pub fn info(self) -> (&'static str, &'static str) {
        match self {
            Self::Angel => ("angel", "pass a toll free once"),
            Self::Arrest => ("emergency arrest", "moved to prison immediately"),
            Self::Earthquake => ("earthquake", "downgrade a land"),
            Self::GiftProperty => ("a present", "give away a land"),
            Self::Moonwalk => ("moonwalk", "throw the dice but go backward"),
            Self::MoveToSeoul => ("visit to Seoul", "moved to Seoul immediately"),
            Self::MoveToStart => ("back to the start", "moved to the start immediately"),
            Self::Overprice => ("overprice", "double the toll of a land"),
            Self::Pickpocket => ("pickpocket", "pick pockets while moving one die"),
            Self::Punishment => ("scourge", "summon a prisoner onto your land"),
            Self::Push => ("knockback", "push a chosen person back once"),
            Self::QuadrupleDice => ("4X dice", "your next roll uses four dice"),
            Self::SingleDice => ("1X dice", "your next roll uses one die"),
            Self::Storm => ("thunderstorm", "moved to a random land"),
            Self::TripleDice => ("3X dice", "your next roll uses three dice"),
        }
    }
}

/// Building level a property is being upgraded to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyLevel {
    /// Level index, 0 (bare land) through 4 (landmark)
    pub value: u8,
    /// Price of reaching this level
    pub costs: i64,
}

impl PropertyLevel {
    /// `(building, verb)` label for the level, `None` for an unknown index
    pub fn label(&self) -> Option<(&'static str, &'static str)> {
        match self.value {
            0 => Some(("land", "bought")),
            1 => Some(("villa", "build")),
            2 => Some(("skyscraper", "build")),
            3 => Some(("hotel", "build")),
            4 => Some(("landmark", "build")),
            _ => None,
        }
    }
}

/// An owned property as the dialogs see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub zone: ZoneId,
    pub name: String,
    /// Amount the property sells for when seized
    pub assets: i64,
}

/// A zone as the dialogs see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRef {
    pub id: ZoneId,
    pub name: String,
}

/// A piece as the dialogs see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRef {
    pub id: PieceId,
    pub name: String,
}

/// Sound cues the dialogs ask the presentation layer to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// One slot machine cycle of the magic dialog
    MagicSpin,
    /// The tax countdown changed its displayed amount
    TaxTick,
    /// The tax countdown ran out and the full amount is due
    TaxPenalty,
}

/// Where a cue is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueSite {
    /// At the stand of a piece
    Piece(PieceId),
}

/// A title shown to everyone at the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub subtitle: String,
    /// How long the title stays up, in milliseconds
    pub stay_ms: u64,
}

impl Announcement {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, stay_ms: u64) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            stay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec3::new(2.5, 2.5, 0.0).rotate_around_y(PI / 2.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 2.5).abs() < 1e-9);
        assert!((v.z + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_level_labels() {
        let level = PropertyLevel { value: 3, costs: 100 };
        assert_eq!(level.label(), Some(("hotel", "build")));
        assert_eq!(
            PropertyLevel { value: 2, costs: 80 }.label(),
            Some(("skyscraper", "build"))
        );
        assert_eq!(PropertyLevel { value: 5, costs: 0 }.label(), None);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec3::default().normalize(), Vec3::default());
        assert!((Vec3::new(3.0, 4.0, 0.0).normalize().length() - 1.0).abs() < 1e-9);
    }
}
