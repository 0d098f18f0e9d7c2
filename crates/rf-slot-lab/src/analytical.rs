//! Exact payback calculation
//!
//! The chance of seeing exactly `k` copies of a symbol on `R` independent
//! reels is binomial: `C(R, k) · p^k · (1 − p)^(R − k)`. Summing
//! `payout · probability` over the winnings table gives the theoretical
//! payback the simulation should converge to.
//!
//! For combinations with `count > R / 2` the events of different symbols are
//! mutually exclusive, so the sum matches the max-payout rule of
//! [`PayoutCalculator`](crate::payout::PayoutCalculator) exactly. Tables that
//! pay on lower counts overlap and the figure becomes an upper bound.

use serde::Serialize;

use rf_core::Symbol;

use crate::probability::ProbabilityTable;
use crate::winnings::WinningsTable;

/// `C(n, k)` via the multiplicative form; `None` when the result overflows
///
/// Each partial product `C(n − k + i, i)` is itself a binomial coefficient,
/// so the division is always exact.
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 1..=k as u128 {
        result = result.checked_mul(n as u128 - k as u128 + i)? / i;
    }
    u64::try_from(result).ok()
}

/// Floating point fallback for coefficients past `u64`
fn binomial_f64(n: u64, k: u64) -> f64 {
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
}

/// One row of the payback breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinationOdds {
    pub symbol: Symbol,
    pub count: u32,
    pub amount: u64,
    /// Probability of exactly `count` copies in one spin
    pub probability: f64,
    /// `amount · probability · 100`
    pub contribution: f64,
}

/// Closed-form odds over a probability and a winnings table
#[derive(Debug, Clone, Copy)]
pub struct AnalyticalCalculator<'a> {
    probabilities: &'a ProbabilityTable,
    winnings: &'a WinningsTable,
    reel_count: u32,
}

impl<'a> AnalyticalCalculator<'a> {
    /// Reel count is taken from the winnings table
    pub fn new(probabilities: &'a ProbabilityTable, winnings: &'a WinningsTable) -> Self {
        Self {
            probabilities,
            winnings,
            reel_count: winnings.reel_count(),
        }
    }

    pub fn reel_count(&self) -> u32 {
        self.reel_count
    }

    /// Probability that one spin shows exactly `count` copies of `symbol`
    pub fn probability_of(&self, symbol: Symbol, count: u32) -> f64 {
        if count > self.reel_count {
            return 0.0;
        }

        let n = self.reel_count as u64;
        let k = count as u64;
        let coefficient = match binomial(n, k) {
            Some(c) => c as f64,
            None => binomial_f64(n, k),
        };

        let p = self.probabilities.fraction(symbol);
        coefficient * p.powi(count as i32) * (1.0 - p).powi((self.reel_count - count) as i32)
    }

    /// Per-combination odds for every non-zero winnings entry
    pub fn breakdown(&self) -> Vec<CombinationOdds> {
        self.winnings
            .entries()
            .map(|entry| {
                let probability = self.probability_of(entry.symbol, entry.count);
                CombinationOdds {
                    symbol: entry.symbol,
                    count: entry.count,
                    amount: entry.amount,
                    probability,
                    contribution: entry.amount as f64 * probability * 100.0,
                }
            })
            .collect()
    }

    /// Theoretical payback in percent of the amount wagered
    pub fn payback_percentage(&self) -> f64 {
        let expected: f64 = self
            .winnings
            .entries()
            .map(|entry| entry.amount as f64 * self.probability_of(entry.symbol, entry.count))
            .sum();
        expected * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binomial_small_values() {
        assert_eq!(binomial(3, 0), Some(1));
        assert_eq!(binomial(3, 2), Some(3));
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(18, 9), Some(48_620));
        assert_eq!(binomial(2, 3), Some(0));
    }

    #[test]
    fn test_binomial_large_values_do_not_wrap() {
        // Naive 60! overflows u64 long before this
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        assert_eq!(binomial(67, 33), Some(14_226_520_737_620_288_370));
        assert_eq!(binomial(200, 100), None);
    }

    #[test]
    fn test_binomial_f64_matches_exact() {
        assert_relative_eq!(binomial_f64(60, 30), 118_264_581_564_861_424.0, max_relative = 1e-12);
    }

    #[test]
    fn test_default_tables_pay_91_percent() {
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        assert_relative_eq!(calc.payback_percentage(), 91.0, epsilon = 1e-9);
    }

    #[test]
    fn test_probability_of() {
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        assert_relative_eq!(calc.probability_of(Symbol::Bell, 3), 0.001, epsilon = 1e-12);
        assert_relative_eq!(calc.probability_of(Symbol::Cherry, 2), 0.189, epsilon = 1e-12);
        assert_eq!(calc.probability_of(Symbol::Shoe, 1), 0.0);
        assert_eq!(calc.probability_of(Symbol::Bell, 4), 0.0);
    }

    #[test]
    fn test_counts_sum_to_one() {
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        let total: f64 = (0..=3).map(|k| calc.probability_of(Symbol::Clover, k)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_cherry_pays_1000_percent() {
        let probabilities = ProbabilityTable::with_defaults([0, 100, 0, 0, 0, 0]).unwrap();
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Cherry, 3, 10).unwrap();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        assert_eq!(calc.payback_percentage(), 1000.0);
    }

    #[test]
    fn test_payback_is_deterministic() {
        let mut probabilities = ProbabilityTable::default();
        probabilities.set(Symbol::Seven, 7).unwrap();
        let winnings = WinningsTable::default();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        assert_eq!(calc.payback_percentage(), calc.payback_percentage());
    }

    #[test]
    fn test_breakdown_sums_to_payback() {
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();
        let calc = AnalyticalCalculator::new(&probabilities, &winnings);
        let rows = calc.breakdown();
        assert_eq!(rows.len(), winnings.len());
        let total: f64 = rows.iter().map(|r| r.contribution).sum();
        assert_relative_eq!(total, calc.payback_percentage(), epsilon = 1e-9);
    }
}
