//! Particle data model.

use serde::{Deserialize, Serialize};
use sparkfx_core::Vec2;
use sparkfx_render::Color;

use crate::config::{EffectFlags, PresetType};

/// Unique particle identifier within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

/// Drawing style of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualType {
    /// Five-pointed star.
    Sparkle,
    /// Radial-gradient disc with a flickering flame tongue.
    Fire,
    /// Crossed strokes.
    Lightning,
    /// Triangle shard.
    Ice,
    /// Disc with orbiting satellites.
    Magic,
    /// Disc with concentric rings.
    Energy,
    /// Plain disc.
    Dust,
    /// Soft radial-gradient disc.
    Orb,
}

impl VisualType {
    /// Maps a preset family to its particle style.
    #[must_use]
    pub const fn from_preset(preset: PresetType) -> Self {
        match preset {
            PresetType::SparkleRain => Self::Sparkle,
            PresetType::FireStorm => Self::Fire,
            PresetType::LightningBurst => Self::Lightning,
            PresetType::IceShards => Self::Ice,
            PresetType::MagicDust => Self::Magic,
            PresetType::EnergyFlow => Self::Energy,
            PresetType::OrbField => Self::Orb,
            PresetType::DustCloud | PresetType::Custom => Self::Dust,
        }
    }

    /// Shape index used by the instancing back-end.
    #[must_use]
    pub const fn shape_index(self) -> u32 {
        match self {
            Self::Sparkle => 0,
            Self::Fire => 1,
            Self::Lightning => 2,
            Self::Ice => 3,
            Self::Magic => 4,
            Self::Energy => 5,
            Self::Dust => 6,
            Self::Orb => 7,
        }
    }
}

/// A resolved attractor: absolute position plus strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    /// Attractor position in pixels.
    pub point: Vec2,
    /// Pull strength.
    pub strength: f32,
}

/// Per-particle physics parameters. `None` means the force is absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsParams {
    /// Downward acceleration (px/ms²).
    pub gravity: Option<f32>,
    /// Velocity fraction lost per ms.
    pub friction: Option<f32>,
    /// Velocity fraction kept on an edge hit.
    pub bounce: Option<f32>,
    /// Turbulence multiplier. Zero disables jitter.
    pub turbulence: f32,
    /// Attractor.
    pub attraction: Option<Attractor>,
}

/// One live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Identifier.
    pub id: ParticleId,
    /// Position (px).
    pub position: Vec2,
    /// Velocity (px/ms).
    pub velocity: Vec2,
    /// Remaining life (ms). Never above `max_life`.
    pub life: f32,
    /// Life at birth (ms).
    pub max_life: f32,
    /// Base radius (px).
    pub size: f32,
    /// Color.
    pub color: Color,
    /// Drawing style.
    pub visual_type: VisualType,
    /// Opacity multiplier from the effect's intensity tier.
    pub intensity: f32,
    /// Forces.
    pub physics: PhysicsParams,
    /// Visual treatments.
    pub flags: EffectFlags,
    /// Derived: `life / max_life`, in `[0, 1]`.
    pub opacity: f32,
    /// Derived: rotation in radians.
    pub rotation: f32,
    /// Derived: size multiplier, tracks opacity when scaling is on.
    pub scale: f32,
}

impl Particle {
    /// Returns true once the particle has no life left.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.life.is_nan() || self.life <= 0.0
    }

    /// Remaining life as a fraction of `max_life`.
    #[inline]
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Final opacity: life fraction times intensity.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.opacity * self.intensity).clamp(0.0, 1.0)
    }
}
