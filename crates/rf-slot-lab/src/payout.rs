//! Payout evaluation against the winnings table

use rf_core::{Outcome, SlotError, SlotResult, Symbol};

use crate::run_data::RunData;
use crate::winnings::WinningsTable;

/// Computes what an outcome pays
///
/// Only the single best-paying (symbol, count) combination in an outcome
/// counts; simultaneous matches are never summed.
#[derive(Debug, Clone, Copy)]
pub struct PayoutCalculator<'a> {
    winnings: &'a WinningsTable,
}

impl<'a> PayoutCalculator<'a> {
    pub fn new(winnings: &'a WinningsTable) -> Self {
        Self { winnings }
    }

    /// Highest payout over every symbol's occurrence count
    pub fn evaluate(&self, outcome: &Outcome) -> u64 {
        let counts = outcome.symbol_counts();
        Symbol::ALL
            .iter()
            .filter(|s| counts[s.index()] > 0)
            .map(|&s| self.winnings.get(s, counts[s.index()]))
            .max()
            .unwrap_or(0)
    }

    /// Total payout over aggregated outcomes
    ///
    /// Fails with `PayoutOverflow` when the total does not fit in a `u64`.
    pub fn evaluate_batch(&self, data: &RunData) -> SlotResult<u64> {
        let mut total = 0u64;
        for (key, occurrences) in data.iter() {
            let outcome = key.decode()?;
            total = self
                .evaluate(&outcome)
                .checked_mul(occurrences)
                .and_then(|payout| total.checked_add(payout))
                .ok_or(SlotError::PayoutOverflow)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::OutcomeKey;

    #[test]
    fn test_pair_of_bells_pays() {
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Bell, 2, 5).unwrap();
        winnings.set(Symbol::Cherry, 1, 0).unwrap();

        let calc = PayoutCalculator::new(&winnings);
        let outcome = Outcome::new(vec![Symbol::Bell, Symbol::Bell, Symbol::Cherry]);
        assert_eq!(calc.evaluate(&outcome), 5);
    }

    #[test]
    fn test_best_combination_wins_not_sum() {
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Bell, 1, 2).unwrap();
        winnings.set(Symbol::Cherry, 1, 3).unwrap();
        winnings.set(Symbol::Clover, 1, 1).unwrap();

        let calc = PayoutCalculator::new(&winnings);
        let outcome = Outcome::new(vec![Symbol::Bell, Symbol::Cherry, Symbol::Clover]);
        assert_eq!(calc.evaluate(&outcome), 3);
    }

    #[test]
    fn test_defaults() {
        let winnings = WinningsTable::default();
        let calc = PayoutCalculator::new(&winnings);
        assert_eq!(calc.evaluate(&Outcome::uniform(Symbol::Bell, 3)), 100);
        assert_eq!(
            calc.evaluate(&Outcome::new(vec![Symbol::Cherry, Symbol::Clover, Symbol::Cherry])),
            1
        );
        assert_eq!(
            calc.evaluate(&Outcome::new(vec![Symbol::Bell, Symbol::Cherry, Symbol::Clover])),
            0
        );
    }

    #[test]
    fn test_evaluate_batch_weights_by_occurrences() {
        let winnings = WinningsTable::default();
        let calc = PayoutCalculator::new(&winnings);

        let mut data = RunData::new();
        data.add(OutcomeKey::from_raw(111), 2); // Bell x3 -> 100 each
        data.add(OutcomeKey::from_raw(211), 3); // Bell x2 -> 5 each
        data.add(OutcomeKey::from_raw(321), 10); // nothing
        assert_eq!(calc.evaluate_batch(&data).unwrap(), 215);
    }

    #[test]
    fn test_evaluate_batch_reports_overflow() {
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Cherry, 3, i64::MAX).unwrap();
        let calc = PayoutCalculator::new(&winnings);

        let data: RunData = [(OutcomeKey::from_raw(222), 3)].into_iter().collect();
        assert!(matches!(
            calc.evaluate_batch(&data),
            Err(SlotError::PayoutOverflow)
        ));
    }

    #[test]
    fn test_evaluate_batch_reports_overflowing_sum() {
        let mut winnings = WinningsTable::empty(3);
        for symbol in [Symbol::Bell, Symbol::Cherry, Symbol::Clover] {
            winnings.set(symbol, 3, i64::MAX).unwrap();
        }
        let calc = PayoutCalculator::new(&winnings);

        // Each product fits, the sum of three does not
        let data: RunData = [111, 222, 333]
            .into_iter()
            .map(|raw| (OutcomeKey::from_raw(raw), 1))
            .collect();
        assert!(matches!(
            calc.evaluate_batch(&data),
            Err(SlotError::PayoutOverflow)
        ));
    }

    #[test]
    fn test_evaluate_batch_rejects_bad_key() {
        let winnings = WinningsTable::default();
        let calc = PayoutCalculator::new(&winnings);
        let data: RunData = [(OutcomeKey::from_raw(190), 1)].into_iter().collect();
        assert!(calc.evaluate_batch(&data).is_err());
    }
}
