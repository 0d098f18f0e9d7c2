//! rf-core: Shared types for the ReelForge payback lab
//!
//! Symbols, reel outcomes and their numeric keys, machine settings and the
//! error type used across all crates.

mod error;
mod settings;
mod symbol;
mod tick_scale;

pub use error::*;
pub use settings::*;
pub use symbol::*;
pub use tick_scale::*;
