//! Slot machine facade
//!
//! Bundles the configuration tables, normal play and the auto-play engine
//! behind one object. Table mutations are refused while auto-play runs so a
//! session always sees a stable configuration.

use crossbeam_channel::Receiver;

use rf_core::{MachineSettings, Outcome, Symbol, WinningsEntry};
use rf_slot_lab::{
    AnalyticalCalculator, CombinationOdds, NormalPlay, PayoutCalculator, ProbabilityTable,
    SpinOutcome, SymbolGenerator, WinningsTable,
};

use crate::config::AutoPlayConfig;
use crate::engine::AutoPlayEngine;
use crate::error::{AutoPlayError, AutoPlayResult};
use crate::report::ConvergenceReport;
use crate::session::{AutoPlayEvent, SessionState};

pub struct SlotMachine {
    settings: MachineSettings,
    probabilities: ProbabilityTable,
    winnings: WinningsTable,
    play: NormalPlay,
    generator: SymbolGenerator,
    engine: AutoPlayEngine,
}

impl SlotMachine {
    /// Build every component from validated settings
    pub fn new(settings: &MachineSettings) -> AutoPlayResult<Self> {
        settings.validate()?;

        let probabilities = ProbabilityTable::from_settings(settings)?;
        let winnings = WinningsTable::from_settings(settings)?;
        let generator = match settings.seed {
            Some(seed) => SymbolGenerator::with_seed(&probabilities, seed),
            None => SymbolGenerator::new(&probabilities),
        };

        Ok(Self {
            settings: settings.clone(),
            play: NormalPlay::from_settings(settings),
            engine: AutoPlayEngine::new(AutoPlayConfig::from_settings(settings)),
            probabilities,
            winnings,
            generator,
        })
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    pub fn probabilities(&self) -> &ProbabilityTable {
        &self.probabilities
    }

    pub fn winnings(&self) -> &WinningsTable {
        &self.winnings
    }

    pub fn engine(&self) -> &AutoPlayEngine {
        &self.engine
    }

    fn ensure_unlocked(&self) -> AutoPlayResult<()> {
        if self.engine.state() == SessionState::Running {
            log::warn!("Configuration change rejected while auto-play is running");
            return Err(AutoPlayError::ConfigLocked);
        }
        Ok(())
    }

    // ─── Configuration ────────────────────────────────────────────────────────

    pub fn set_probability(&mut self, symbol: Symbol, percentage: u8) -> AutoPlayResult<()> {
        self.ensure_unlocked()?;
        self.probabilities.set(symbol, percentage)?;
        self.generator.sync(&self.probabilities);
        Ok(())
    }

    pub fn reset_probabilities(&mut self) -> AutoPlayResult<()> {
        self.ensure_unlocked()?;
        self.probabilities.reset_to_defaults();
        self.generator.sync(&self.probabilities);
        Ok(())
    }

    pub fn set_winnings(&mut self, symbol: Symbol, count: u32, amount: i64) -> AutoPlayResult<()> {
        self.ensure_unlocked()?;
        self.winnings.set(symbol, count, amount)?;
        Ok(())
    }

    pub fn reset_winnings(&mut self) -> AutoPlayResult<()> {
        self.ensure_unlocked()?;
        self.winnings.reset_to_defaults()?;
        Ok(())
    }

    /// Winnings for count = reels and reels - 1, zero entries included
    pub fn winnings_view(&self) -> Vec<WinningsEntry> {
        self.winnings.complete_view()
    }

    // ─── Analysis ─────────────────────────────────────────────────────────────

    pub fn analytical_payback(&self) -> f64 {
        AnalyticalCalculator::new(&self.probabilities, &self.winnings).payback_percentage()
    }

    pub fn payback_breakdown(&self) -> Vec<CombinationOdds> {
        AnalyticalCalculator::new(&self.probabilities, &self.winnings).breakdown()
    }

    // ─── Auto-play ────────────────────────────────────────────────────────────

    /// Start an auto-play session of `runs` spins
    pub fn start_autoplay(&self, runs: u64) -> AutoPlayResult<Receiver<AutoPlayEvent>> {
        self.engine.run(runs, &self.probabilities, &self.winnings)
    }

    /// Start an auto-play session with the configured default run count
    pub fn start_default_autoplay(&self) -> AutoPlayResult<Receiver<AutoPlayEvent>> {
        self.start_autoplay(self.engine.config().runs)
    }

    pub fn cancel_autoplay(&self) {
        self.engine.cancel();
    }

    /// Observed vs expected counts of the latest session
    pub fn convergence_report(&self) -> AutoPlayResult<ConvergenceReport> {
        let snapshot = self.engine.aggregated_data_snapshot();
        ConvergenceReport::build(&snapshot, &self.probabilities, &self.winnings)
    }

    // ─── Normal play ──────────────────────────────────────────────────────────

    pub fn credits(&self) -> u64 {
        self.play.credits()
    }

    pub fn reels(&self) -> &Outcome {
        self.play.reels()
    }

    pub fn add_credit(&mut self) {
        self.play.add_credit();
    }

    pub fn spin(&mut self) -> AutoPlayResult<SpinOutcome> {
        let payout = PayoutCalculator::new(&self.winnings);
        Ok(self.play.spin(&mut self.generator, &payout)?)
    }

    pub fn last_win(&self) -> u64 {
        self.play.last_win(&PayoutCalculator::new(&self.winnings))
    }
}
