//! # SPARKFX Core
//!
//! Zero-allocation building blocks for the SPARKFX particle engine:
//! - [`SlotPool`] - fixed-capacity slab with a free list of indices
//! - [`RandomSource`] - injectable random numbers (seedable for tests)
//! - [`Vec2`] - pixel-space vector math
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools are sized once per effect
//! 2. **Dead slots are recycled by index** - nothing is reallocated per frame
//! 3. **Randomness is a parameter** - nothing reaches for a global RNG
//!
//! ## Example
//!
//! ```rust,ignore
//! use sparkfx_core::{SlotPool, SeededRandom, RandomSource};
//!
//! let mut pool: SlotPool<f32> = SlotPool::new(128);
//! let mut rng = SeededRandom::from_seed(7);
//! pool.allocate(rng.range(0.0, 1.0));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod math;
pub mod memory;
pub mod random;

pub use math::Vec2;
pub use memory::{SlotHandle, SlotPool};
pub use random::{RandomSource, SeededRandom};
