//! Machine settings
//!
//! One `MachineSettings` value is built at startup (defaults, or loaded from
//! JSON) and handed by reference to every component constructor.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbol::{MAX_REELS, Symbol};

/// Payout for an outcome containing `count` copies of `symbol`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningsEntry {
    pub symbol: Symbol,
    pub count: u32,
    pub amount: u64,
}

impl WinningsEntry {
    pub fn new(symbol: Symbol, count: u32, amount: u64) -> Self {
        Self { symbol, count, amount }
    }
}

/// Scalar settings plus the initial probability and winnings setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Number of reels (wheels)
    pub reel_count: u32,

    /// Intermediate reel updates drawn per normal spin
    pub rotations_per_spin: u32,

    /// Delay between rotations (display only)
    pub rotation_delay_ms: u64,

    /// Credits available when a session starts
    pub initial_credits: u64,

    /// Default number of auto-play runs
    pub autoplay_runs: u64,

    /// Run count at which auto-play reports every percentage point
    pub autoplay_update_threshold: u64,

    /// Auto-play worker threads (0 = one per CPU)
    pub autoplay_workers: usize,

    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,

    /// Percent weight per symbol, must sum to 100
    pub initial_probabilities: BTreeMap<Symbol, u8>,

    /// Non-zero default payouts
    pub initial_winnings: Vec<WinningsEntry>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let initial_probabilities = BTreeMap::from([
            (Symbol::Bell, 10),
            (Symbol::Cherry, 30),
            (Symbol::Clover, 60),
            (Symbol::Melon, 0),
            (Symbol::Seven, 0),
            (Symbol::Shoe, 0),
        ]);

        let initial_winnings = vec![
            WinningsEntry::new(Symbol::Bell, 3, 100),
            WinningsEntry::new(Symbol::Cherry, 3, 10),
            WinningsEntry::new(Symbol::Clover, 3, 1),
            WinningsEntry::new(Symbol::Bell, 2, 5),
            WinningsEntry::new(Symbol::Cherry, 2, 1),
        ];

        Self {
            reel_count: 3,
            rotations_per_spin: 20,
            rotation_delay_ms: 100,
            initial_credits: 10,
            autoplay_runs: 1000,
            autoplay_update_threshold: 1_000_000,
            autoplay_workers: 1,
            seed: None,
            initial_probabilities,
            initial_winnings,
        }
    }
}

impl MachineSettings {
    /// Initial probability for a symbol (0 when unset)
    pub fn initial_probability(&self, symbol: Symbol) -> u8 {
        self.initial_probabilities.get(&symbol).copied().unwrap_or(0)
    }

    /// Initial payout for a symbol count (0 when unset)
    pub fn initial_winnings(&self, symbol: Symbol, count: u32) -> u64 {
        self.initial_winnings
            .iter()
            .find(|e| e.symbol == symbol && e.count == count)
            .map(|e| e.amount)
            .unwrap_or(0)
    }

    /// Check ranges and the sum-to-100 invariant
    pub fn validate(&self) -> SlotResult<()> {
        if self.reel_count == 0 || self.reel_count > MAX_REELS {
            return Err(SlotError::Settings(format!(
                "reel_count must be between 1 and {}, got {}",
                MAX_REELS, self.reel_count
            )));
        }

        if self.autoplay_update_threshold == 0 {
            return Err(SlotError::Settings(
                "autoplay_update_threshold must be positive".into(),
            ));
        }

        if let Some((symbol, p)) = self.initial_probabilities.iter().find(|&(_, &p)| p > 100) {
            return Err(SlotError::Settings(format!(
                "probability for {} is {}%, must be at most 100%",
                symbol, p
            )));
        }

        let total: u32 = Symbol::ALL
            .iter()
            .map(|&s| self.initial_probability(s) as u32)
            .sum();
        if total != 100 {
            return Err(SlotError::Settings(format!(
                "initial probabilities sum to {}%, expected 100%",
                total
            )));
        }

        if let Some(entry) = self.initial_winnings.iter().find(|e| e.count == 0) {
            return Err(SlotError::Settings(format!(
                "winnings entry for {} has count 0",
                entry.symbol
            )));
        }

        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let settings: MachineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading machine settings from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = MachineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.initial_probability(Symbol::Cherry), 30);
        assert_eq!(settings.initial_winnings(Symbol::Bell, 3), 100);
        assert_eq!(settings.initial_winnings(Symbol::Shoe, 3), 0);
    }

    #[test]
    fn test_json_round_trip_preserves_tables() {
        let settings = MachineSettings {
            seed: Some(7),
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        let parsed = MachineSettings::from_json(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = MachineSettings::from_json(r#"{ "initial_credits": 50 }"#).unwrap();
        assert_eq!(parsed.initial_credits, 50);
        assert_eq!(parsed.reel_count, 3);
        assert_eq!(parsed.initial_probability(Symbol::Clover), 60);
    }

    #[test]
    fn test_rejects_bad_probability_sum() {
        let json = r#"{ "initial_probabilities": { "Bell": 50, "Cherry": 30 } }"#;
        assert!(matches!(
            MachineSettings::from_json(json),
            Err(SlotError::Settings(_))
        ));
    }

    #[test]
    fn test_rejects_bad_reel_count() {
        let settings = MachineSettings {
            reel_count: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = MachineSettings {
            reel_count: MAX_REELS + 1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_count_winnings() {
        let mut settings = MachineSettings::default();
        settings.initial_winnings.push(WinningsEntry::new(Symbol::Seven, 0, 5));
        assert!(settings.validate().is_err());
    }
}
