//! Auto-play configuration

use serde::{Deserialize, Serialize};

use rf_core::MachineSettings;

/// Auto-play session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPlayConfig {
    /// Default number of runs
    pub runs: u64,

    /// Run count at which progress is reported for every percentage point
    pub update_threshold: u64,

    /// Number of worker threads (0 = auto)
    pub workers: usize,

    /// Fixed seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self::from_settings(&MachineSettings::default())
    }
}

impl AutoPlayConfig {
    /// Take the auto-play part of the machine settings
    pub fn from_settings(settings: &MachineSettings) -> Self {
        Self {
            runs: settings.autoplay_runs,
            update_threshold: settings.autoplay_update_threshold,
            workers: settings.autoplay_workers,
            seed: settings.seed,
        }
    }

    /// Set default run count
    pub fn with_runs(mut self, runs: u64) -> Self {
        self.runs = runs;
        self
    }

    /// Set progress update threshold
    pub fn with_update_threshold(mut self, threshold: u64) -> Self {
        self.update_threshold = threshold;
        self
    }

    /// Set worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Worker threads actually used for `runs` draws
    pub fn resolved_workers(&self, runs: u64) -> usize {
        let workers = if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        };
        workers.clamp(1, runs.clamp(1, usize::MAX as u64) as usize)
    }

    /// Completed-run interval between progress reports
    ///
    /// Below the threshold fewer than 100 updates are published so small
    /// sessions do not flood the event stream.
    pub fn progress_interval(&self, runs: u64) -> u64 {
        let modifier = (self.update_threshold / 100).max(1);
        let update_points = (runs / modifier).clamp(1, 100);
        (runs / update_points).max(1)
    }
}
