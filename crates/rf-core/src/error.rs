//! Error types for the slot machine core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum SlotError {
    /// A value outside its permitted range (percentage, count, payout)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The probability table does not cover the sampled space
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid outcome key: {0}")]
    InvalidOutcomeKey(u64),

    #[error("Payout total exceeds {}", u64::MAX)]
    PayoutOverflow,

    #[error("No credits left")]
    InsufficientCredits,

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
