//! RF-Autoplay — Background batch simulation
//!
//! Runs millions of spins off the calling thread to check a probability and
//! winnings setup against its exact payback:
//! - Cancellable sessions with throttled, monotonic progress
//! - Lock-guarded outcome tally with consistent snapshots
//! - Optional fan-out over a rayon pool
//! - Observed vs expected symbol-count report
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        SlotMachine                            │
//! │                                                               │
//! │  ProbabilityTable   WinningsTable   NormalPlay                │
//! │         │                 │                                   │
//! │         v                 v                                   │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │ AutoPlayEngine ── "rf-autoplay" thread                  │  │
//! │  │   [batch 1] [batch 2] ... [batch W] → Mutex<Tally>      │  │
//! │  │   events ──→ crossbeam channel (Progress / Completed)   │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! │                           │                                   │
//! │                           v                                   │
//! │                   ConvergenceReport                           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rf_autoplay::{AutoPlayEvent, SlotMachine};
//! use rf_core::MachineSettings;
//!
//! let machine = SlotMachine::new(&MachineSettings::default())?;
//! let events = machine.start_autoplay(1_000_000)?;
//! for event in events {
//!     if let AutoPlayEvent::Progress(percent) = event {
//!         println!("{}%", percent);
//!     }
//! }
//! println!("payback {:.2}%", machine.engine().payback_percent());
//! ```

mod config;
mod engine;
mod error;
mod machine;
mod report;
mod session;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use machine::*;
pub use report::*;
pub use session::*;
