//! Error types for auto-play sessions

use thiserror::Error;

use rf_core::SlotError;

/// Auto-play errors
#[derive(Error, Debug)]
pub enum AutoPlayError {
    #[error("Auto-play is already running")]
    AlreadyRunning,

    #[error("Configuration is locked while auto-play is running")]
    ConfigLocked,

    #[error("Invalid run count: {0}")]
    InvalidRunCount(u64),

    #[error("Failed to start auto-play worker: {0}")]
    WorkerSpawn(String),

    #[error("Auto-play worker failed: {0}")]
    WorkerFailed(String),

    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Result type for auto-play operations
pub type AutoPlayResult<T> = Result<T, AutoPlayError>;
