//! Dialog timing and geometry configuration
//!
//! Every deadline and linger the handlers use lives here so a table can
//! slow dialogs down (or a test can speed them up) without touching the
//! handlers. All durations are stored as milliseconds so the JSON form stays
//! flat:
//!
//! ```json
//! { "tick_ms": 50, "dice_timeout_ms": 15000, "tax_deceleration": 0.04 }
//! ```
//!
//! Missing fields take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DialogResult;
use crate::value_objects::Vec3;

/// Timing and geometry for every dialog handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Cooperative tick used by polling loops, feedback loops and countdowns
    pub tick_ms: u64,
    pub dice_timeout_ms: u64,
    pub upgrade_timeout_ms: u64,
    pub acquisition_timeout_ms: u64,
    pub seizure_timeout_ms: u64,
    pub betting_timeout_ms: u64,
    pub magic_timeout_ms: u64,
    /// Shared by zone and piece targeting
    pub target_timeout_ms: u64,
    /// Pause between showing the dice total and returning it
    pub dice_linger_ms: u64,
    pub magic_linger_ms: u64,
    pub tax_linger_ms: u64,
    /// Amount the tax countdown speed grows every tick
    pub tax_deceleration: f64,
    /// Length of the random vector added to every roll impulse
    pub dice_jitter: f64,
    /// Horizontal distance of each die from the fan center
    pub dice_radius: f64,
    /// Height of the dice above the spawn anchor
    pub dice_height: f64,
    /// Where dice spawn when the acting piece has no live agent
    pub board_center: Vec3,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            dice_timeout_ms: 15_000,
            upgrade_timeout_ms: 15_000,
            acquisition_timeout_ms: 10_000,
            seizure_timeout_ms: 60_000,
            betting_timeout_ms: 15_000,
            magic_timeout_ms: 5_000,
            target_timeout_ms: 10_000,
            dice_linger_ms: 1_000,
            magic_linger_ms: 2_000,
            tax_linger_ms: 2_000,
            tax_deceleration: 0.04,
            dice_jitter: 0.2,
            dice_radius: 2.5,
            dice_height: 2.5,
            board_center: Vec3::default(),
        }
    }
}

impl DialogConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> DialogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> DialogResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn dice_timeout(&self) -> Duration {
        Duration::from_millis(self.dice_timeout_ms)
    }

    pub fn upgrade_timeout(&self) -> Duration {
        Duration::from_millis(self.upgrade_timeout_ms)
    }

    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_millis(self.acquisition_timeout_ms)
    }

    pub fn seizure_timeout(&self) -> Duration {
        Duration::from_millis(self.seizure_timeout_ms)
    }

    pub fn betting_timeout(&self) -> Duration {
        Duration::from_millis(self.betting_timeout_ms)
    }

    pub fn magic_timeout(&self) -> Duration {
        Duration::from_millis(self.magic_timeout_ms)
    }

    pub fn target_timeout(&self) -> Duration {
        Duration::from_millis(self.target_timeout_ms)
    }

    pub fn dice_linger(&self) -> Duration {
        Duration::from_millis(self.dice_linger_ms)
    }

    pub fn magic_linger(&self) -> Duration {
        Duration::from_millis(self.magic_linger_ms)
    }

    pub fn tax_linger(&self) -> Duration {
        Duration::from_millis(self.tax_linger_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table_rules() {
        let config = DialogConfig::default();
        assert_eq!(config.upgrade_timeout(), Duration::from_secs(15));
        assert_eq!(config.acquisition_timeout(), Duration::from_secs(10));
        assert_eq!(config.seizure_timeout(), Duration::from_secs(60));
        assert_eq!(config.magic_timeout(), Duration::from_secs(5));
        assert_eq!(config.tick(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DialogConfig::from_json_str(r#"{ "betting_timeout_ms": 500 }"#).unwrap();
        assert_eq!(config.betting_timeout(), Duration::from_millis(500));
        assert_eq!(config.dice_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_bad_json_is_rejected() {
        assert!(DialogConfig::from_json_str("{ tick_ms: }").is_err());
    }
}
