//! Probability setup: percent weight per symbol, always summing to 100

use serde::{Deserialize, Serialize};

use rf_core::{MachineSettings, SlotError, SlotResult, Symbol};

/// Percent weight per symbol
///
/// Every mutation keeps the sum of all weights at exactly 100: changing one
/// symbol redistributes the difference over the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProbabilityTableData")]
pub struct ProbabilityTable {
    /// Weights indexed like `Symbol::ALL`
    percentages: [u8; Symbol::COUNT],
    /// Weights restored by `reset_to_defaults`
    defaults: [u8; Symbol::COUNT],
    /// Bumped on every mutation so observers can detect changes
    revision: u64,
}

/// Unchecked wire form, validated on the way into a `ProbabilityTable`
#[derive(Deserialize)]
struct ProbabilityTableData {
    percentages: [u8; Symbol::COUNT],
    defaults: [u8; Symbol::COUNT],
    #[serde(default)]
    revision: u64,
}

impl TryFrom<ProbabilityTableData> for ProbabilityTable {
    type Error = SlotError;

    fn try_from(data: ProbabilityTableData) -> SlotResult<Self> {
        let defaults = Self::with_defaults(data.defaults)?;
        let current = Self::with_defaults(data.percentages)?;
        Ok(Self {
            percentages: current.percentages,
            defaults: defaults.defaults,
            revision: data.revision,
        })
    }
}

impl ProbabilityTable {
    /// Create from the settings' initial probabilities
    pub fn from_settings(settings: &MachineSettings) -> SlotResult<Self> {
        let mut defaults = [0u8; Symbol::COUNT];
        for symbol in Symbol::ALL {
            defaults[symbol.index()] = settings.initial_probability(symbol);
        }
        Self::with_defaults(defaults)
    }

    /// Create from explicit weights (indexed like `Symbol::ALL`)
    pub fn with_defaults(defaults: [u8; Symbol::COUNT]) -> SlotResult<Self> {
        let total: u32 = defaults.iter().map(|&p| p as u32).sum();
        if total != 100 || defaults.iter().any(|&p| p > 100) {
            return Err(SlotError::InvalidArgument(format!(
                "probabilities must sum to 100, got {}",
                total
            )));
        }

        Ok(Self {
            percentages: defaults,
            defaults,
            revision: 0,
        })
    }

    /// Percentage for a symbol
    #[inline]
    pub fn get(&self, symbol: Symbol) -> u8 {
        self.percentages[symbol.index()]
    }

    /// Probability in [0, 1]
    #[inline]
    pub fn fraction(&self, symbol: Symbol) -> f64 {
        self.get(symbol) as f64 / 100.0
    }

    /// All (symbol, percentage) pairs in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u8)> + '_ {
        Symbol::ALL.iter().map(|&s| (s, self.get(s)))
    }

    pub fn total(&self) -> u32 {
        self.percentages.iter().map(|&p| p as u32).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set one symbol's percentage and rebalance the others
    ///
    /// The difference is absorbed by the remaining symbols in enumeration
    /// order: the first symbol that can take the whole difference does;
    /// otherwise each symbol is pushed to its limit (0 or 100) and the rest
    /// carries on to the next one.
    pub fn set(&mut self, symbol: Symbol, percentage: u8) -> SlotResult<()> {
        if percentage > 100 {
            return Err(SlotError::InvalidArgument(format!(
                "probability for {} must be within 0..=100, got {}",
                symbol, percentage
            )));
        }

        let idx = symbol.index();
        let mut change = percentage as i32 - self.percentages[idx] as i32;
        self.percentages[idx] = percentage;

        for other in Symbol::ALL {
            if other == symbol || change == 0 {
                continue;
            }

            let current = self.percentages[other.index()] as i32;
            let potential = current - change;
            if (0..=100).contains(&potential) {
                self.percentages[other.index()] = potential as u8;
                change = 0;
            } else if change < 0 {
                // Target decreased, raise this one to its ceiling
                change += 100 - current;
                self.percentages[other.index()] = 100;
            } else {
                // Target increased, drain this one
                change -= current;
                self.percentages[other.index()] = 0;
            }
        }

        if change != 0 {
            log::warn!(
                "Probability change for {} left {}% unabsorbed (total now {}%)",
                symbol,
                change,
                self.total()
            );
        }

        self.revision += 1;
        Ok(())
    }

    /// Restore the initial probabilities
    pub fn reset_to_defaults(&mut self) {
        self.percentages = self.defaults;
        self.revision += 1;
    }
}

impl Default for ProbabilityTable {
    fn default() -> Self {
        let settings = MachineSettings::default();
        let mut defaults = [0u8; Symbol::COUNT];
        for symbol in Symbol::ALL {
            defaults[symbol.index()] = settings.initial_probability(symbol);
        }
        Self {
            percentages: defaults,
            defaults,
            revision: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = ProbabilityTable::default();
        assert_eq!(table.get(Symbol::Bell), 10);
        assert_eq!(table.get(Symbol::Cherry), 30);
        assert_eq!(table.get(Symbol::Clover), 60);
        assert_eq!(table.get(Symbol::Shoe), 0);
        assert_eq!(table.total(), 100);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut table = ProbabilityTable::default();
        let before = table.clone();
        assert!(matches!(
            table.set(Symbol::Bell, 101),
            Err(SlotError::InvalidArgument(_))
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn test_increase_drains_in_enumeration_order() {
        let mut table = ProbabilityTable::default();
        // +70 for Cherry: Bell can only give 10, Clover gives the remaining 60
        table.set(Symbol::Cherry, 100).unwrap();
        assert_eq!(table.get(Symbol::Cherry), 100);
        for symbol in Symbol::ALL.iter().filter(|&&s| s != Symbol::Cherry) {
            assert_eq!(table.get(*symbol), 0);
        }
        assert_eq!(table.total(), 100);
    }

    #[test]
    fn test_decrease_goes_to_first_symbol_with_room() {
        let mut table = ProbabilityTable::default();
        table.set(Symbol::Clover, 0).unwrap();
        // Bell absorbs the full 60 (10 + 60 = 70)
        assert_eq!(table.get(Symbol::Bell), 70);
        assert_eq!(table.get(Symbol::Cherry), 30);
        assert_eq!(table.get(Symbol::Clover), 0);
        assert_eq!(table.total(), 100);
    }

    #[test]
    fn test_decrease_spills_over_full_symbols() {
        let mut table = ProbabilityTable::default();
        table.set(Symbol::Bell, 100).unwrap();
        table.set(Symbol::Bell, 0).unwrap();
        // Cherry is first with room and takes all 100
        assert_eq!(table.get(Symbol::Cherry), 100);
        assert_eq!(table.total(), 100);
    }

    #[test]
    fn test_sum_invariant_over_sequence() {
        let mut table = ProbabilityTable::default();
        let steps = [
            (Symbol::Shoe, 40),
            (Symbol::Melon, 25),
            (Symbol::Bell, 0),
            (Symbol::Seven, 100),
            (Symbol::Seven, 3),
            (Symbol::Clover, 55),
            (Symbol::Cherry, 0),
            (Symbol::Shoe, 100),
            (Symbol::Bell, 17),
        ];
        for (symbol, pct) in steps {
            table.set(symbol, pct).unwrap();
            assert_eq!(table.get(symbol), pct);
            assert_eq!(table.total(), 100, "after setting {} to {}", symbol, pct);
            assert!(table.iter().all(|(_, p)| p <= 100));
        }
    }

    #[test]
    fn test_reset_and_revision() {
        let mut table = ProbabilityTable::default();
        assert_eq!(table.revision(), 0);
        table.set(Symbol::Seven, 20).unwrap();
        assert_eq!(table.revision(), 1);
        table.reset_to_defaults();
        assert_eq!(table.revision(), 2);
        assert_eq!(table, {
            let mut fresh = ProbabilityTable::default();
            fresh.revision = 2;
            fresh
        });
    }

    #[test]
    fn test_with_defaults_requires_sum_100() {
        assert!(ProbabilityTable::with_defaults([50, 0, 0, 0, 0, 0]).is_err());
        let table = ProbabilityTable::with_defaults([0, 100, 0, 0, 0, 0]).unwrap();
        assert_eq!(table.get(Symbol::Cherry), 100);
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut table = ProbabilityTable::default();
        table.set(Symbol::Seven, 25).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: ProbabilityTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_deserialize_rejects_bad_sum() {
        let json = r#"{"percentages":[90,90,0,0,0,0],"defaults":[10,30,60,0,0,0],"revision":0}"#;
        assert!(serde_json::from_str::<ProbabilityTable>(json).is_err());

        let json = r#"{"percentages":[10,30,60,0,0,0],"defaults":[0,0,0,0,0,0]}"#;
        assert!(serde_json::from_str::<ProbabilityTable>(json).is_err());
    }
}
