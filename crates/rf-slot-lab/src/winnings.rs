//! Winnings setup: payout per (symbol, count) combination

use std::collections::BTreeMap;

use rf_core::{MachineSettings, SlotError, SlotResult, Symbol, WinningsEntry};

/// Sparse payout table keyed by (symbol, count)
///
/// Only non-zero payouts are stored. Iteration order is deterministic
/// (symbol, then count), which keeps the analytical payback reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningsTable {
    reel_count: u32,
    entries: BTreeMap<(Symbol, u32), u64>,
    defaults: Vec<WinningsEntry>,
    revision: u64,
}

impl WinningsTable {
    /// Table seeded with the settings' initial winnings
    pub fn from_settings(settings: &MachineSettings) -> SlotResult<Self> {
        let mut table = Self {
            reel_count: settings.reel_count,
            entries: BTreeMap::new(),
            defaults: settings.initial_winnings.clone(),
            revision: 0,
        };
        table.seed_defaults()?;
        table.revision = 0;
        Ok(table)
    }

    /// Table without any payouts
    pub fn empty(reel_count: u32) -> Self {
        Self {
            reel_count,
            entries: BTreeMap::new(),
            defaults: Vec::new(),
            revision: 0,
        }
    }

    pub fn reel_count(&self) -> u32 {
        self.reel_count
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Payout for `count` copies of `symbol` (0 when unset)
    #[inline]
    pub fn get(&self, symbol: Symbol, count: u32) -> u64 {
        self.entries.get(&(symbol, count)).copied().unwrap_or(0)
    }

    /// Set a payout; an amount of 0 removes the entry
    pub fn set(&mut self, symbol: Symbol, count: u32, amount: i64) -> SlotResult<()> {
        let amount = u64::try_from(amount).map_err(|_| {
            SlotError::InvalidArgument(format!(
                "winnings for {} x{} must not be negative, got {}",
                symbol, count, amount
            ))
        })?;
        self.insert(symbol, count, amount)?;
        self.revision += 1;
        Ok(())
    }

    fn insert(&mut self, symbol: Symbol, count: u32, amount: u64) -> SlotResult<()> {
        if count < 1 {
            return Err(SlotError::InvalidArgument(format!(
                "winnings count for {} must be at least 1",
                symbol
            )));
        }
        if amount == 0 {
            self.entries.remove(&(symbol, count));
        } else {
            self.entries.insert((symbol, count), amount);
        }
        Ok(())
    }

    /// Drop all payouts
    pub fn clear(&mut self) {
        self.entries.clear();
        self.revision += 1;
    }

    /// Replace all payouts with the initial winnings
    pub fn reset_to_defaults(&mut self) -> SlotResult<()> {
        self.entries.clear();
        self.seed_defaults()?;
        Ok(())
    }

    fn seed_defaults(&mut self) -> SlotResult<()> {
        let defaults = self.defaults.clone();
        for entry in defaults.iter().filter(|e| e.amount > 0) {
            self.insert(entry.symbol, entry.count, entry.amount)?;
        }
        self.revision += 1;
        Ok(())
    }

    /// Non-zero entries in (symbol, count) order
    pub fn entries(&self) -> impl Iterator<Item = WinningsEntry> + '_ {
        self.entries
            .iter()
            .map(|(&(symbol, count), &amount)| WinningsEntry::new(symbol, count, amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every symbol for count = reels and reels - 1, zero payouts included
    pub fn complete_view(&self) -> Vec<WinningsEntry> {
        let lowest = self.reel_count.saturating_sub(1).max(1);
        (lowest..=self.reel_count)
            .rev()
            .flat_map(|count| {
                Symbol::ALL
                    .iter()
                    .map(move |&symbol| WinningsEntry::new(symbol, count, self.get(symbol, count)))
            })
            .collect()
    }
}

impl Default for WinningsTable {
    fn default() -> Self {
        let settings = MachineSettings::default();
        let mut entries = BTreeMap::new();
        for entry in &settings.initial_winnings {
            entries.insert((entry.symbol, entry.count), entry.amount);
        }
        Self {
            reel_count: settings.reel_count,
            entries,
            defaults: settings.initial_winnings,
            revision: 0,
        }
    }
}
