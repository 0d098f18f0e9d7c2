//! Observed vs expected symbol counts
//!
//! Compares what an auto-play session actually drew with what the binomial
//! odds predict for the same number of runs.

use std::collections::BTreeMap;

use serde::Serialize;

use rf_core::{SlotResult, Symbol};
use rf_slot_lab::{AnalyticalCalculator, PayoutCalculator, ProbabilityTable, RunData, WinningsTable};

use crate::error::AutoPlayResult;
use crate::session::RunDataSnapshot;

// ═══════════════════════════════════════════════════════════════════════════════
// SYMBOL COUNT HISTOGRAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Occurrences per (symbol, count) over aggregated outcomes
///
/// Every symbol showing on more than one reel adds the outcome's occurrence
/// count to its bucket; single symbols are not tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolCountHistogram {
    buckets: BTreeMap<(Symbol, u32), u64>,
}

impl SymbolCountHistogram {
    pub fn get(&self, symbol: Symbol, count: u32) -> u64 {
        self.buckets.get(&(symbol, count)).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u32, u64)> + '_ {
        self.buckets.iter().map(|(&(s, c), &n)| (s, c, n))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Build the histogram by decoding every outcome key
pub fn symbol_count_histogram(data: &RunData) -> SlotResult<SymbolCountHistogram> {
    let mut histogram = SymbolCountHistogram::default();
    for (key, occurrences) in data.iter() {
        let counts = key.decode()?.symbol_counts();
        for symbol in Symbol::ALL {
            let count = counts[symbol.index()];
            if count > 1 {
                *histogram.buckets.entry((symbol, count)).or_insert(0) += occurrences;
            }
        }
    }
    Ok(histogram)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERGENCE REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// One (symbol, count) line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub symbol: Symbol,
    pub count: u32,
    pub observed: u64,
    pub expected: f64,
    /// `observed / expected · 100`; None when nothing is expected
    pub percent_of_expected: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub runs_completed: u64,
    pub complete: bool,
    /// Only present for completed sessions
    pub empirical_payback: Option<f64>,
    pub analytical_payback: f64,
    pub rows: Vec<ConvergenceRow>,
}

impl ConvergenceReport {
    /// Compare a snapshot with the odds of the given tables
    ///
    /// Rows cover count = reels and reels - 1 (descending), each symbol in
    /// enumeration order. Counts below 2 are skipped since the histogram
    /// does not track single symbols.
    pub fn build(
        snapshot: &RunDataSnapshot,
        probabilities: &ProbabilityTable,
        winnings: &WinningsTable,
    ) -> AutoPlayResult<Self> {
        let analytical = AnalyticalCalculator::new(probabilities, winnings);
        let histogram = symbol_count_histogram(&snapshot.counts)?;
        let runs = snapshot.runs_completed;

        let reels = analytical.reel_count();
        let lowest = reels.saturating_sub(1).max(2);
        let mut rows = Vec::new();
        for count in (lowest..=reels).rev() {
            for symbol in Symbol::ALL {
                let observed = histogram.get(symbol, count);
                let expected = analytical.probability_of(symbol, count) * runs as f64;
                let percent_of_expected = if runs > 0 && expected > 0.0 {
                    Some(observed as f64 / expected * 100.0)
                } else {
                    None
                };
                rows.push(ConvergenceRow {
                    symbol,
                    count,
                    observed,
                    expected,
                    percent_of_expected,
                });
            }
        }

        let empirical_payback = if snapshot.complete && runs > 0 {
            let total = PayoutCalculator::new(winnings).evaluate_batch(&snapshot.counts)?;
            Some(total as f64 * 100.0 / runs as f64)
        } else {
            None
        };

        Ok(Self {
            runs_completed: runs,
            complete: snapshot.complete,
            empirical_payback,
            analytical_payback: analytical.payback_percentage(),
            rows,
        })
    }

    /// Row for a (symbol, count) pair
    pub fn row(&self, symbol: Symbol, count: u32) -> Option<&ConvergenceRow> {
        self.rows
            .iter()
            .find(|r| r.symbol == symbol && r.count == count)
    }
}
