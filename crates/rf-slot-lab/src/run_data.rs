//! Aggregated auto-play outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rf_core::OutcomeKey;

/// Occurrence count per outcome key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunData {
    counts: BTreeMap<OutcomeKey, u64>,
}

impl RunData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `key`
    #[inline]
    pub fn record(&mut self, key: OutcomeKey) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Add `count` occurrences of `key`
    pub fn add(&mut self, key: OutcomeKey, count: u64) {
        if count > 0 {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }

    /// Occurrences of `key`
    pub fn get(&self, key: OutcomeKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Sum of all occurrence counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Distinct outcomes seen
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeKey, u64)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(OutcomeKey, u64)> for RunData {
    fn from_iter<I: IntoIterator<Item = (OutcomeKey, u64)>>(iter: I) -> Self {
        let mut data = RunData::new();
        for (key, count) in iter {
            data.add(key, count);
        }
        data
    }
}
