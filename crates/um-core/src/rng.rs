//! Deterministic simulation RNG.
//!
//! One `SimRng` seeded from `SimConfig::seed` drives every random decision in
//! a run (spawn counts, origin/destination picks).  The loop is
//! single-threaded, so the same seed and inputs replay a run exactly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded simulation-level RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.0.gen_bool(p)
    }

    /// Pick two distinct elements of `slice`, or `None` if it has fewer
    /// than two.
    pub fn choose_distinct_pair<T: Copy>(&mut self, slice: &[T]) -> Option<(T, T)> {
        if slice.len() < 2 {
            return None;
        }
        let a = self.0.gen_range(0..slice.len());
        // Draw from the remaining n-1 slots and skip over `a`.
        let mut b = self.0.gen_range(0..slice.len() - 1);
        if b >= a {
            b += 1;
        }
        Some((slice[a], slice[b]))
    }
}
