//! # SPARKFX Render
//!
//! Back-end independent drawing for the SPARKFX particle engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      RENDER PATH                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  TypeRenderer ──► DrawSurface (trait)                     │
//! │                     ├── CommandRecorder  (replay, tests)  │
//! │                     └── CanvasSurface    (browser canvas) │
//! │  TypeRenderer ──► InstanceBuffer        (GPU instancing)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A surface that reports a zero size is treated as absent: the engine keeps
//! simulating but draws nothing.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod command;
pub mod instance;
pub mod surface;

#[cfg(feature = "canvas")]
pub mod canvas;

pub use color::{Color, ColorParseError};
pub use command::{CommandRecorder, DrawCommand};
pub use instance::{InstanceBuffer, ParticleInstance};
pub use surface::{DrawSurface, Paint, RadialGradient};

#[cfg(feature = "canvas")]
pub use canvas::CanvasSurface;
