#![forbid(unsafe_code)]

//! Injectable randomness.
//!
//! Every random choice on the desktop (reply jitter, filler shuffles, reveal
//! thresholds, new-mail counts) goes through [`RandomSource`]. Production
//! hosts seed a [`SeededRandom`]; tests and replays script exact draws with
//! [`SequenceRandom`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// `floor(next_f64() * n)`, always below `n`. Returns `0` when `n == 0`.
    fn next_below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let scaled = (self.next_f64() * f64::from(n)).floor();
        if scaled.is_finite() && scaled > 0.0 {
            (scaled as u32).min(n - 1)
        } else {
            0
        }
    }

    /// Uniform integer in `[low, low + span)`.
    fn next_in(&mut self, low: u32, span: u32) -> u32 {
        low.saturating_add(self.next_below(span))
    }
}

/// Seeded small, fast generator for hosts.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Create a generator from a host-supplied seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Scripted draws, cycling through a fixed list.
///
/// Values outside `[0, 1)` are clamped into range.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always draws `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 0.999_999_999)
        }
    }
}

/// Fisher-Yates shuffle of `0..n`, walking from the last index down.
pub fn shuffled_indexes(n: usize, rng: &mut dyn RandomSource) -> Vec<usize> {
    let mut indexes: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let bound = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let j = rng.next_below(bound) as usize;
        indexes.swap(i, j);
    }
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn next_below_matches_floor_scaling() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.34, 0.99, 0.5]);
        assert_eq!(rng.next_below(3), 0);
        assert_eq!(rng.next_below(3), 1);
        assert_eq!(rng.next_below(3), 2);
        assert_eq!(rng.next_in(800, 900), 1250);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn zero_bound_never_draws_out_of_range() {
        let mut rng = SequenceRandom::constant(0.7);
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn shuffle_with_zero_draws_rotates_front() {
        let mut rng = SequenceRandom::constant(0.0);
        assert_eq!(shuffled_indexes(4, &mut rng), vec![1, 2, 3, 0]);
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_below(1000), b.next_below(1000));
        }
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(n in 0usize..40, seed in any::<u64>()) {
            let mut rng = SeededRandom::new(seed);
            let mut out = shuffled_indexes(n, &mut rng);
            out.sort_unstable();
            prop_assert_eq!(out, (0..n).collect::<Vec<_>>());
        }

        #[test]
        fn next_below_stays_in_range(n in 1u32..10_000, seed in any::<u64>()) {
            let mut rng = SeededRandom::new(seed);
            prop_assert!(rng.next_below(n) < n);
        }
    }
}
