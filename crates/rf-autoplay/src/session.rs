//! Session state, events and data snapshots

use serde::{Deserialize, Serialize};

use rf_slot_lab::RunData;

/// Auto-play session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Session reached a final state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Events published by a running session
///
/// The stream ends with exactly one of `Completed`, `Cancelled` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AutoPlayEvent {
    Started { runs: u64, workers: usize },
    /// Percent complete, strictly increasing
    Progress(u8),
    Completed { payback: f64, runs: u64 },
    Cancelled { runs_completed: u64 },
    Failed(String),
}

impl AutoPlayEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled { .. } | Self::Failed(_)
        )
    }
}

/// Point-in-time copy of the aggregated outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDataSnapshot {
    pub counts: RunData,
    pub runs_completed: u64,
    pub runs_requested: u64,
    /// Only complete data yields a trustworthy payback
    pub complete: bool,
}
