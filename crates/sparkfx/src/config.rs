//! # Effect Configuration
//!
//! [`ParticleSystemConfig`] fully describes one effect: what it looks like,
//! how its particles move, and how many it may keep alive. Configs are
//! plain data, loaded from TOML and shared as `Arc` by every session that
//! uses them.
//!
//! Units: time in milliseconds, distance in pixels, velocity in px/ms,
//! gravity in px/ms², friction as a fraction of velocity lost per ms.

use serde::{Deserialize, Serialize};
use sparkfx_core::RandomSource;
use sparkfx_render::Color;

/// Preset family. Selects the visual type of every particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetType {
    /// Falling golden stars.
    SparkleRain,
    /// Rising flames.
    FireStorm,
    /// Short, fast electric bolts.
    LightningBurst,
    /// Spinning crystal shards.
    IceShards,
    /// Orbiting magical motes.
    MagicDust,
    /// Ringed energy pulses.
    EnergyFlow,
    /// Soft drifting dust.
    DustCloud,
    /// Glowing orbs.
    OrbField,
    /// Anything else; drawn as plain discs.
    #[default]
    #[serde(other)]
    Custom,
}

/// Coarse brightness level of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTier {
    /// Subtle.
    Low,
    /// Default.
    #[default]
    Medium,
    /// Bright.
    High,
    /// Fully opaque.
    Ultra,
}

impl IntensityTier {
    /// Opacity multiplier applied to every particle of the effect.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Low => 0.4,
            Self::Medium => 0.6,
            Self::High => 0.8,
            Self::Ultra => 1.0,
        }
    }
}

/// Closed numeric interval, written `[min, max]` in TOML.
///
/// Reversed intervals are sampled as if their bounds were swapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct SampleRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl SampleRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range holding exactly one value.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Draws a value from the range.
    #[inline]
    pub fn sample(self, rng: &mut dyn RandomSource) -> f32 {
        rng.range(self.min, self.max)
    }

    /// Returns true if `min > max`.
    #[must_use]
    pub fn is_reversed(self) -> bool {
        self.min > self.max
    }

    /// Returns true if both bounds are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl From<[f32; 2]> for SampleRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self::new(min, max)
    }
}

impl From<SampleRange> for [f32; 2] {
    fn from(range: SampleRange) -> Self {
        [range.min, range.max]
    }
}

/// Pull toward a point near the spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractionSettings {
    /// Pull strength. Acceleration is `strength / distance²`.
    pub strength: f32,
    /// Attractor position relative to the spawn point, in pixels.
    pub offset: [f32; 2],
}

impl Default for AttractionSettings {
    fn default() -> Self {
        Self {
            strength: 0.0,
            offset: [0.0, 0.0],
        }
    }
}

/// Forces applied to every particle of an effect.
///
/// A zero gravity, friction or bounce means the force is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration (px/ms²). Negative values rise.
    pub gravity: f32,
    /// Velocity fraction lost per millisecond.
    pub friction: f32,
    /// Velocity fraction kept when hitting a viewport edge.
    pub bounce: f32,
    /// Multiplier on the engine's turbulence amplitude. Zero disables jitter.
    pub turbulence: f32,
    /// Optional attractor.
    pub attraction: Option<AttractionSettings>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            friction: 0.0,
            bounce: 0.0,
            turbulence: 1.0,
            attraction: None,
        }
    }
}

/// Optional visual treatments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectFlags {
    /// Colored blur around the particle.
    pub glow: bool,
    /// Short motion streak behind the particle.
    pub trail: bool,
    /// Radius oscillates over time.
    pub pulse: bool,
    /// Particle spins.
    pub rotate: bool,
    /// Radius shrinks with remaining life.
    pub scale: bool,
}

impl EffectFlags {
    /// Packs the flags as instance bits: glow 1, trail 2, pulse 4, rotate 8, scale 16.
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.glow as u32)
            | (self.trail as u32) << 1
            | (self.pulse as u32) << 2
            | (self.rotate as u32) << 3
            | (self.scale as u32) << 4
    }
}

/// Particle budget and adaptive quality switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    /// Let frame timing lower and raise the particle cap.
    pub adaptive_enabled: bool,
    /// Hard ceiling on live particles.
    pub max_particles: usize,
    /// Starting quality scalar in `[0, 1]`.
    pub quality_tier: f32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            adaptive_enabled: true,
            max_particles: 150,
            quality_tier: 1.0,
        }
    }
}

/// Complete description of one effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// Preset family; picks the particle shape.
    pub preset_type: PresetType,
    /// Brightness tier.
    pub intensity: IntensityTier,
    /// How long the effect keeps spawning (ms).
    pub duration_ms: f32,
    /// Particles spawned at start. Non-positive spawns none.
    pub initial_particle_count: i64,
    /// Forces.
    pub physics: PhysicsSettings,
    /// Colors picked uniformly per particle. Empty spawns nothing.
    pub palette: Vec<Color>,
    /// Particle radius (px).
    pub size_range: SampleRange,
    /// Launch speed (px/ms).
    pub speed_range: SampleRange,
    /// Particle lifetime (ms).
    pub life_range: SampleRange,
    /// Visual treatments.
    pub effects: EffectFlags,
    /// Budget.
    pub performance: PerformanceSettings,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            preset_type: PresetType::Custom,
            intensity: IntensityTier::Medium,
            duration_ms: 2000.0,
            initial_particle_count: 50,
            physics: PhysicsSettings::default(),
            palette: vec![Color::WHITE],
            size_range: SampleRange::new(2.0, 5.0),
            speed_range: SampleRange::new(0.05, 0.2),
            life_range: SampleRange::new(800.0, 1600.0),
            effects: EffectFlags::default(),
            performance: PerformanceSettings::default(),
        }
    }
}

impl ParticleSystemConfig {
    /// Returns the initial spawn count, treating negatives as zero.
    #[must_use]
    pub fn initial_count(&self) -> usize {
        usize::try_from(self.initial_particle_count).unwrap_or(0)
    }

    /// Lists settings that will make the effect look empty or odd.
    ///
    /// None of these are errors: the effect still runs and completes.
    #[must_use]
    pub fn degeneracies(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        if self.palette.is_empty() {
            found.push("empty palette spawns no particles");
        }
        if self.performance.max_particles == 0 {
            found.push("max_particles is zero");
        }
        if self.initial_particle_count <= 0 {
            found.push("non-positive initial particle count");
        }
        if self.life_range.max <= 0.0 && self.life_range.min <= 0.0 {
            found.push("particles expire on their first frame");
        }
        if self.size_range.is_reversed()
            || self.speed_range.is_reversed()
            || self.life_range.is_reversed()
        {
            found.push("reversed range (bounds are swapped when sampling)");
        }
        found
    }

    /// Checks for values that cannot be simulated at all.
    ///
    /// # Errors
    ///
    /// Returns a description of the first non-finite value found.
    pub fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("duration_ms", self.duration_ms),
            ("physics.gravity", self.physics.gravity),
            ("physics.friction", self.physics.friction),
            ("physics.bounce", self.physics.bounce),
            ("physics.turbulence", self.physics.turbulence),
            ("performance.quality_tier", self.performance.quality_tier),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{name} must be finite"));
        }
        let ranges = [
            ("size_range", self.size_range),
            ("speed_range", self.speed_range),
            ("life_range", self.life_range),
        ];
        if let Some((name, _)) = ranges.iter().find(|(_, r)| !r.is_finite()) {
            return Err(format!("{name} must be finite"));
        }
        if let Some(attraction) = self.physics.attraction {
            if !attraction.strength.is_finite() || !attraction.offset.iter().all(|v| v.is_finite()) {
                return Err("physics.attraction must be finite".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkfx_core::random::ConstantRandom;

    #[test]
    fn test_intensity_multipliers() {
        assert_eq!(IntensityTier::Low.multiplier(), 0.4);
        assert_eq!(IntensityTier::Medium.multiplier(), 0.6);
        assert_eq!(IntensityTier::High.multiplier(), 0.8);
        assert_eq!(IntensityTier::Ultra.multiplier(), 1.0);
    }

    #[test]
    fn test_reversed_range_samples_inside_bounds() {
        let range = SampleRange::new(10.0, 2.0);
        assert!(range.is_reversed());

        let mut low = ConstantRandom(0.0);
        let mut high = ConstantRandom(1.0);
        assert_eq!(range.sample(&mut low), 2.0);
        assert!(range.sample(&mut high) <= 10.0);
    }

    #[test]
    fn test_flag_bits() {
        let flags = EffectFlags {
            glow: true,
            rotate: true,
            ..Default::default()
        };
        assert_eq!(flags.bits(), 1 | 8);
        assert_eq!(EffectFlags::default().bits(), 0);
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let config: ParticleSystemConfig = toml::from_str(
            r##"
            preset_type = "ice-shards"
            intensity = "ultra"
            palette = ["#ff0000", "#00ff0080"]
            life_range = [100.0, 200.0]

            [physics]
            gravity = 0.001
            "##,
        )
        .unwrap();

        assert_eq!(config.preset_type, PresetType::IceShards);
        assert_eq!(config.intensity, IntensityTier::Ultra);
        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.life_range, SampleRange::new(100.0, 200.0));
        assert_eq!(config.physics.gravity, 0.001);
        assert_eq!(config.physics.turbulence, 1.0);
        assert!(config.performance.adaptive_enabled);
    }

    #[test]
    fn test_unknown_preset_type_is_custom() {
        let config: ParticleSystemConfig = toml::from_str(r#"preset_type = "confetti""#).unwrap();
        assert_eq!(config.preset_type, PresetType::Custom);
    }

    #[test]
    fn test_degeneracies_reported_not_rejected() {
        let config = ParticleSystemConfig {
            palette: Vec::new(),
            initial_particle_count: -5,
            ..Default::default()
        };
        assert_eq!(config.initial_count(), 0);
        assert_eq!(config.degeneracies().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let config = ParticleSystemConfig {
            duration_ms: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
