//! # Memory Management
//!
//! Pre-allocated slot pools for zero-allocation particle simulation.
//!
//! ## Design Philosophy
//!
//! A pool is allocated once when an effect starts. While it runs:
//! - No heap allocations
//! - Dead slots are reused by index
//! - Predictable, flat frame times

mod pool;

pub use pool::{SlotHandle, SlotPool};
