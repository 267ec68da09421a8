//! Deterministic random numbers for wander headings, aim error and flee
//! targets.
//!
//! Given the same seed, an arena replays the same sequence of rolls. Callers
//! outside the simulation (the runtime picking a seed) may use any entropy
//! source; nothing inside the rules does.

use core::f64::consts::TAU;

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64 bits of state, 32-bit output.
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// Independent stream for one entity, derived from the arena seed.
    pub fn derive(seed: u64, stream: u32) -> Self {
        Self::new(compute_seed(seed, stream, 0))
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output (xorshift high, random rotate).
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let high = u64::from(self.next_u32()) << 21;
        let low = u64::from(self.next_u32()) >> 11;
        (high | low) as f64 / (1u64 << 53) as f64
    }

    /// Uniform float in `[low, high)`. Returns `low` for an empty range.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if !(high > low) {
            return low;
        }
        low + self.next_f64() * (high - low)
    }

    /// Uniform heading in `[0, 2π)`.
    pub fn heading(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    /// Symmetric error in `[-spread, spread)`.
    pub fn spread(&mut self, spread: f64) -> f64 {
        self.range_f64(-spread, spread)
    }
}

/// Mixes a base seed with a stream id and a salt using SplitMix64-style
/// avalanche steps.
pub fn compute_seed(seed: u64, stream: u32, salt: u32) -> u64 {
    let mut hash = seed;
    hash ^= u64::from(stream).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(salt).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
