//! Seedable random source for mine placement.
//!
//! Uses the `rand` crate with `SmallRng` (xoshiro256++), which is fast and
//! builds for WASM. Entropy comes from `getrandom` on every target.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Random source owned by whoever lays out boards.
///
/// Seed it for deterministic replay, or create it from system entropy.
pub struct BoardRng {
    inner: SmallRng,
}

impl BoardRng {
    /// Create from system entropy.
    pub fn new() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Create with a specific seed for deterministic behavior.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Pick `count` distinct entries of `candidates` uniformly at random.
    ///
    /// Returns fewer than `count` items only when there are not enough
    /// candidates.
    pub fn sample_distinct(&mut self, mut candidates: Vec<usize>, count: usize) -> Vec<usize> {
        let count = count.min(candidates.len());
        let (picked, _) = candidates.partial_shuffle(&mut self.inner, count);
        picked.to_vec()
    }
}

impl Default for BoardRng {
    fn default() -> Self {
        Self::new()
    }
}
