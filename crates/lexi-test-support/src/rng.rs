//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use lexi_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range` and `0.0` for
/// `next_f64`. Note that `0.0` is below any positive probability, so every
/// probabilistic branch fires under `MockRng`.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns values from predetermined sequences, one for integers
/// and one for floats. Panics if a sequence is exhausted, which makes an
/// unexpected extra draw fail the test loudly.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    floats: Vec<f64>,
    index: usize,
    float_index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given integer and float values.
    #[must_use]
    pub fn new(values: Vec<u32>, floats: Vec<f64>) -> Self {
        Self {
            values,
            floats,
            index: 0,
            float_index: 0,
        }
    }

    /// Number of float draws made so far.
    #[must_use]
    pub fn float_draws(&self) -> usize {
        self.float_index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    fn next_f64(&mut self) -> f64 {
        let val = self.floats[self.float_index];
        self.float_index += 1;
        val
    }
}
