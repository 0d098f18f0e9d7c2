//! Normal (credit-based) play

use serde::Serialize;

use rf_core::{MachineSettings, Outcome, SlotError, SlotResult, Symbol};

use crate::generator::SymbolGenerator;
use crate::payout::PayoutCalculator;

/// Result of one normal spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinOutcome {
    /// Intermediate reel states; the last one is the result
    pub frames: Vec<Outcome>,
    pub outcome: Outcome,
    pub credits_won: u64,
}

/// Credit balance and the reels currently showing
#[derive(Debug, Clone)]
pub struct NormalPlay {
    credits: u64,
    reels: Outcome,
    rotations_per_spin: u32,
}

impl NormalPlay {
    pub fn from_settings(settings: &MachineSettings) -> Self {
        Self {
            credits: settings.initial_credits,
            reels: Outcome::uniform(Symbol::Cherry, settings.reel_count as usize),
            rotations_per_spin: settings.rotations_per_spin.max(1),
        }
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn reels(&self) -> &Outcome {
        &self.reels
    }

    /// Insert one credit
    pub fn add_credit(&mut self) {
        self.credits = self.credits.saturating_add(1);
    }

    /// Payout of the reels currently showing
    pub fn last_win(&self, payout: &PayoutCalculator<'_>) -> u64 {
        payout.evaluate(&self.reels)
    }

    /// Spend one credit and spin all reels
    pub fn spin(
        &mut self,
        generator: &mut SymbolGenerator,
        payout: &PayoutCalculator<'_>,
    ) -> SlotResult<SpinOutcome> {
        if self.credits == 0 {
            return Err(SlotError::InsufficientCredits);
        }

        let reels = self.reels.len();
        let frames = (0..self.rotations_per_spin)
            .map(|_| generator.spin(reels))
            .collect::<SlotResult<Vec<_>>>()?;

        let outcome = match frames.last() {
            Some(last) => last.clone(),
            None => generator.spin(reels)?,
        };

        self.credits -= 1;
        let credits_won = payout.evaluate(&outcome);
        self.credits = self.credits.saturating_add(credits_won);
        self.reels = outcome.clone();

        log::debug!("Spin {} won {} (credits {})", outcome, credits_won, self.credits);

        Ok(SpinOutcome {
            frames,
            outcome,
            credits_won,
        })
    }
}
