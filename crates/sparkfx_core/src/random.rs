//! # Random Sources
//!
//! Every random draw in the engine goes through [`RandomSource`], so callers
//! decide between reproducible streams (tests, replays) and entropy-seeded
//! streams (live effects).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A source of uniformly distributed random numbers.
///
/// Only [`next_f32`](RandomSource::next_f32) is required; the helpers are
/// built on top of it and never panic on degenerate input.
pub trait RandomSource {
    /// Returns a value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Returns a value in `[min, max]`.
    ///
    /// Reversed bounds are swapped rather than rejected.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        lo + (hi - lo) * self.next_f32()
    }

    /// Returns a value in `[-amplitude, amplitude]`.
    fn jitter(&mut self, amplitude: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * amplitude
    }

    /// Returns an index in `0..len`, or None when `len` is zero.
    fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let picked = (self.next_f32() * len as f32) as usize;
        Some(picked.min(len - 1))
    }
}

/// ChaCha8-backed random source.
///
/// Same seed, same stream, on every platform.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a reproducible stream from a 64-bit seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a stream seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Derives an independent child stream.
    ///
    /// Used to hand every effect its own stream from one engine seed.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// A source that always returns the same value.
///
/// `ConstantRandom(0.5)` makes every jitter exactly zero, which pins down
/// otherwise noisy trajectories in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRandom(pub f32);

impl RandomSource for ConstantRandom {
    fn next_f32(&mut self) -> f32 {
        self.0.clamp(0.0, 0.999_999)
    }
}
