//! Engine-wide tuning.
//!
//! Loaded once at startup. Every section and key is optional:
//!
//! ```toml
//! [integrator]
//! turbulence_amplitude = 0.003
//!
//! [quality]
//! decrease_factor = 0.8
//! increase_factor = 1.1
//!
//! [renderer]
//! glow_min_quality = 0.75
//!
//! [limits]
//! max_sessions = 32
//! max_particles_per_effect = 10000
//! seed = 7
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EffectResult;
use crate::physics::IntegratorTuning;
use crate::quality::QualityTuning;
use crate::render::RenderTuning;

/// Engine capacity and determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Most effects that may run at once.
    pub max_sessions: usize,
    /// Largest `max_particles` an effect may request. Pools are allocated
    /// up front, so larger requests are rejected at start.
    pub max_particles_per_effect: usize,
    /// Root seed. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_sessions: 32,
            max_particles_per_effect: 10_000,
            seed: None,
        }
    }
}

/// All engine tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Physics constants.
    pub integrator: IntegratorTuning,
    /// Adaptive quality thresholds and factors.
    pub quality: QualityTuning,
    /// Renderer constants.
    pub renderer: RenderTuning,
    /// Capacity and seeding.
    pub limits: EngineLimits,
}

impl EngineConfig {
    /// Parses tuning from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::ConfigParse`](crate::EffectError::ConfigParse)
    /// for malformed TOML.
    pub fn from_toml_str(text: &str) -> EffectResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Default tuning with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            limits: EngineLimits {
                seed: Some(seed),
                ..EngineLimits::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r"
            [quality]
            decrease_factor = 0.5
            low_fps = 24.0

            [limits]
            seed = 7
            ",
        )
        .unwrap();

        assert_eq!(config.quality.decrease_factor, 0.5);
        assert_eq!(config.quality.low_fps, 24.0);
        assert_eq!(config.quality.increase_factor, 1.1);
        assert_eq!(config.limits.seed, Some(7));
        assert_eq!(config.limits.max_sessions, 32);
        assert_eq!(config.limits.max_particles_per_effect, 10_000);
        assert_eq!(config.integrator, IntegratorTuning::default());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(EngineConfig::from_toml_str("[quality\n").is_err());
    }
}
