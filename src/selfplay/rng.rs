use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform integers for opening sampling and move-selection coin flips.
pub trait RandomSource {
    /// Uniform value in `[0, bound)`; `bound` must be positive.
    fn next_int(&mut self, bound: usize) -> usize;
}

pub struct SeededRandom {
    rng: SmallRng,
    seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed), seed }
    }

    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED);
        Self::new(seed)
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_time, Self::new)
    }

    pub fn seed(&self) -> u64 { self.seed }
}

impl RandomSource for SeededRandom {
    fn next_int(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}
