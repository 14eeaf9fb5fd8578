//! Deterministic random source shared by every kernel of a run.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Deterministic RNG handle threaded through the sampler.
///
/// The handle is a thin wrapper around `StdRng` seeded from the run seed.
/// Exactly one handle exists per run; every kernel borrows it mutably in turn,
/// so the whole chain is reproducible from `(seed, data, config)`.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw on `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform draw on `[low, high)`; returns `low` for an empty interval.
    pub fn uniform_between(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.uniform()
    }

    /// Uniform index in `0..len`. `len` must be positive.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Exponential draw with the given rate, by inversion.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        let u = self.uniform();
        -(1.0 - u).ln() / rate
    }

    /// Fair coin flip.
    pub fn coin(&mut self) -> bool {
        self.uniform() < 0.5
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
