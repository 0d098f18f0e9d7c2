//! Weighted symbol generator

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rf_core::{Outcome, SlotError, SlotResult, Symbol};

use crate::probability::ProbabilityTable;

/// Spreads consecutive session numbers over the seed space
const SESSION_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Draws symbols according to a snapshot of the probability table
///
/// The generator owns its copy of the weights; call [`SymbolGenerator::sync`]
/// after the table changes.
pub struct SymbolGenerator {
    weights: [u8; Symbol::COUNT],
    rng: StdRng,
    seed: Option<u64>,
    /// Number of `reset` calls so far
    sessions: u64,
}

impl SymbolGenerator {
    /// Generator seeded from the OS
    pub fn new(table: &ProbabilityTable) -> Self {
        Self {
            weights: Self::snapshot(table),
            rng: StdRng::from_os_rng(),
            seed: None,
            sessions: 0,
        }
    }

    /// Reproducible generator
    ///
    /// Two generators built from the same seed produce the same draws, also
    /// across the same number of `reset` calls.
    pub fn with_seed(table: &ProbabilityTable, seed: u64) -> Self {
        Self {
            weights: Self::snapshot(table),
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
            sessions: 0,
        }
    }

    fn snapshot(table: &ProbabilityTable) -> [u8; Symbol::COUNT] {
        let mut weights = [0u8; Symbol::COUNT];
        for (symbol, p) in table.iter() {
            weights[symbol.index()] = p;
        }
        weights
    }

    /// Pick up new weights
    pub fn sync(&mut self, table: &ProbabilityTable) {
        self.weights = Self::snapshot(table);
    }

    /// Reseed the random source before a new session
    ///
    /// A seeded generator derives each session's seed from the base seed and
    /// the session number, so consecutive sessions draw different sequences.
    pub fn reset(&mut self) {
        self.sessions = self.sessions.wrapping_add(1);
        self.rng = match self.seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed ^ self.sessions.wrapping_mul(SESSION_STRIDE))
            }
            None => StdRng::from_os_rng(),
        };
    }

    /// Independent generator with the same weights, seeded from this one
    pub fn fork(&mut self) -> SymbolGenerator {
        let seed = self.rng.random::<u64>();
        SymbolGenerator {
            weights: self.weights,
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
            sessions: 0,
        }
    }

    /// Draw one symbol
    ///
    /// A uniform value in [0, 100) selects the first symbol (in enumeration
    /// order) whose cumulative percentage exceeds it.
    pub fn next(&mut self) -> SlotResult<Symbol> {
        let percent = self.rng.random_range(0..100u32);
        let mut accumulated = 0u32;

        for symbol in Symbol::ALL {
            accumulated += self.weights[symbol.index()] as u32;
            if accumulated > percent {
                return Ok(symbol);
            }
        }

        Err(SlotError::Configuration(format!(
            "probabilities cover only {}% of the draw range",
            accumulated
        )))
    }

    /// Draw a full outcome, one symbol per reel
    pub fn spin(&mut self, reels: usize) -> SlotResult<Outcome> {
        let symbols = (0..reels)
            .map(|_| self.next())
            .collect::<SlotResult<Vec<_>>>()?;
        Ok(Outcome::new(symbols))
    }
}
