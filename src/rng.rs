//! Bounded random draws for outcome generation
//!
//! Outcomes move real money, so the live source is the operating system
//! CSPRNG via `rand::rngs::OsRng` with rejection-sampled ranges (no modulo
//! bias). Game functions take the source as a parameter, which keeps them
//! deterministic under test with [`ScriptedDraws`].

use std::collections::VecDeque;

use rand::rngs::OsRng;
use rand::Rng;

/// Uniform bounded-integer source.
pub trait DrawSource {
    /// Uniform integer in `[low, high)`. `high` must be greater than `low`.
    fn int_in(&mut self, low: u64, high: u64) -> u64;

    /// Uniform integer in `[0, bound)`.
    fn int_below(&mut self, bound: u64) -> u64 {
        self.int_in(0, bound)
    }
}

/// Production source backed by the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsDraws;

impl DrawSource for OsDraws {
    fn int_in(&mut self, low: u64, high: u64) -> u64 {
        debug_assert!(low < high, "empty draw range {}..{}", low, high);
        OsRng.gen_range(low..high)
    }
}

/// Replayable source that hands out a fixed sequence of values, for tests
/// that need a known outcome.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDraws {
    values: VecDeque<u64>,
}

impl ScriptedDraws {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl DrawSource for ScriptedDraws {
    fn int_in(&mut self, low: u64, high: u64) -> u64 {
        let value = self
            .values
            .pop_front()
            .unwrap_or_else(|| panic!("scripted draws exhausted (range {}..{})", low, high));
        assert!(
            value >= low && value < high,
            "scripted draw {} outside range {}..{}",
            value,
            low,
            high
        );
        value
    }
}
