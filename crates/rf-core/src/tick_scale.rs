//! Tick ↔ scale mapping for stepped controls
//!
//! A slider with ticks 0..N-1 maps onto a sparse, increasing list of values
//! (e.g. 1, 10, 100, ... for run counts).

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickScale {
    values: Vec<u64>,
}

impl TickScale {
    /// Build from strictly increasing values
    pub fn new(values: Vec<u64>) -> SlotResult<Self> {
        if values.is_empty() {
            return Err(SlotError::InvalidArgument("tick scale needs at least one value".into()));
        }
        if values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SlotError::InvalidArgument(
                "tick scale values must be strictly increasing".into(),
            ));
        }
        Ok(Self { values })
    }

    /// 1, 10, 100, ... 10^max_exponent
    pub fn powers_of_ten(max_exponent: u32) -> Self {
        let max_exponent = max_exponent.min(19);
        Self {
            values: (0..=max_exponent).map(|e| 10u64.pow(e)).collect(),
        }
    }

    /// 1, 2, 5, 10, 20, 50, ... spanning `decades` decades
    pub fn one_two_five(decades: u32) -> Self {
        let decades = decades.clamp(1, 18);
        let mut values = Vec::with_capacity(decades as usize * 3);
        for e in 0..decades {
            let base = 10u64.pow(e);
            values.extend([base, 2 * base, 5 * base]);
        }
        Self { values }
    }

    /// Number of ticks
    pub fn tick_count(&self) -> usize {
        self.values.len()
    }

    pub fn max_tick(&self) -> usize {
        self.values.len() - 1
    }

    /// Scale value for a tick; ticks past the end clamp to the last value
    pub fn tick_to_scale(&self, tick: usize) -> u64 {
        self.values[tick.min(self.max_tick())]
    }

    /// Largest tick whose value does not exceed `value` (0 below the first)
    pub fn scale_to_tick(&self, value: u64) -> usize {
        self.values
            .partition_point(|&v| v <= value)
            .saturating_sub(1)
    }
}
