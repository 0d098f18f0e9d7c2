//! # rf-slot-lab — Reel configuration and payback maths
//!
//! The single-threaded half of the payback lab: probability and winnings
//! setup, weighted symbol draws, payout evaluation and the exact payback
//! oracle the auto-play simulation is checked against.
//!
//! ## Architecture
//!
//! ```text
//! MachineSettings
//!     │
//!     ├── ProbabilityTable (percent per symbol, sum = 100)
//!     │       │
//!     │       ├── SymbolGenerator ──→ Outcome ──→ OutcomeKey ──→ RunData
//!     │       │
//!     ├── WinningsTable ((symbol, count) → amount)
//!     │       │
//!     │       └── PayoutCalculator (best single combination)
//!     │
//!     └── AnalyticalCalculator (binomial odds → payback %)
//! ```

pub mod analytical;
pub mod generator;
pub mod payout;
pub mod play;
pub mod probability;
pub mod run_data;
pub mod winnings;

pub use analytical::*;
pub use generator::*;
pub use payout::*;
pub use play::*;
pub use probability::*;
pub use run_data::*;
pub use winnings::*;
