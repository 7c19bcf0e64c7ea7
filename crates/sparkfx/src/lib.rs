//! # SPARKFX
//!
//! Decorative particle effects with adaptive quality.
//!
//! ## Design Principles
//!
//! 1. **Frame-driven** - one [`EffectEngine::frame`] call per display refresh
//! 2. **Never fails mid-effect** - errors only at configuration boundaries
//! 3. **Fixed storage** - particle pools are sized when an effect starts
//! 4. **Frame rate first** - the particle cap shrinks when frames run long
//! 5. **Presets are data** - see `data/presets.toml`
//!
//! ## Architecture
//!
//! ```text
//! EffectEngine ── PresetRegistry
//!      │
//!      └── EffectSession (one per running effect)
//!             ├── ParticleFactory            spawn
//!             ├── PhysicsIntegrator          move, age, expire
//!             ├── AdaptiveQualityController  cap + quality scalar
//!             └── TypeRenderer ──► DrawSurface
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sparkfx::{EffectEngine, EngineConfig, NormalizedPosition};
//! use sparkfx_render::CommandRecorder;
//!
//! let mut surface = CommandRecorder::new(800.0, 600.0);
//! let mut engine = EffectEngine::with_builtin_presets(EngineConfig::default(), (800.0, 600.0))?;
//!
//! engine.start(
//!     "fire-storm",
//!     NormalizedPosition::CENTER,
//!     Some(Box::new(|| println!("done"))),
//! )?;
//! while engine.active_count() > 0 {
//!     surface.begin_frame();
//!     engine.frame(16.0, Some(&mut surface));
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod particle;
pub mod physics;
pub mod presets;
pub mod quality;
pub mod render;
pub mod session;
pub mod tuning;

pub use config::{
    AttractionSettings, EffectFlags, IntensityTier, ParticleSystemConfig, PerformanceSettings,
    PhysicsSettings, PresetType, SampleRange,
};
pub use engine::{EffectEngine, EffectHandle, EffectSource, EngineReadout, NormalizedPosition};
pub use error::{EffectError, EffectResult};
pub use factory::ParticleFactory;
pub use particle::{Particle, ParticleId, VisualType};
pub use physics::{IntegratorTuning, PhysicsIntegrator};
pub use presets::PresetRegistry;
pub use quality::{AdaptiveQualityController, QualityTuning};
pub use render::{RenderTuning, TypeRenderer};
pub use session::{CompletionCallback, DebugReadout, EffectSession, FrameStatus, SessionState};
pub use tuning::{EngineConfig, EngineLimits};
