//! Deterministic RNG wrapper for the route-set search.
//!
//! # Determinism strategy
//!
//! A search owns exactly one `SearchRng` seeded from the configured seed.
//! All random draws (initial portfolios, operator choice, crossover points,
//! mutation targets) happen on the coordinating thread, so a run is
//! reproducible even when fitness evaluation is spread over Rayon workers.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded search RNG.
pub struct SearchRng(SmallRng);

impl SearchRng {
    pub fn new(seed: u64) -> Self {
        SearchRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Two distinct indices drawn uniformly from `0..n`.
    ///
    /// Returns `None` when `n < 2`.
    pub fn distinct_pair(&mut self, n: usize) -> Option<(usize, usize)> {
        if n < 2 {
            return None;
        }
        let a = self.0.gen_range(0..n);
        // Draw from the n-1 remaining slots and shift past `a`.
        let mut b = self.0.gen_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        Some((a, b))
    }
}
