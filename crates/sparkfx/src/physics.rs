//! # Physics Integrator
//!
//! Advances particles by one frame. Per particle, in order:
//!
//! 1. gravity
//! 2. friction
//! 3. attraction (inverse-square, distance clamped)
//! 4. turbulence jitter
//! 5. life decrement; expired particles are removed in the same pass
//! 6. position
//! 7. viewport bounce
//! 8. derived render state (opacity, rotation, scale)
//!
//! Nothing here allocates.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use sparkfx_core::{RandomSource, SlotPool, Vec2};

use crate::particle::Particle;

/// Integrator constants shared by every effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorTuning {
    /// Velocity jitter per frame at turbulence multiplier 1 (px/ms).
    pub turbulence_amplitude: f32,
    /// Spin speed for rotating particles (rad/ms).
    pub rotation_speed: f32,
    /// Attraction distance floor (px). Keeps the pull finite near the attractor.
    pub min_attraction_distance: f32,
}

impl Default for IntegratorTuning {
    fn default() -> Self {
        Self {
            turbulence_amplitude: 0.003,
            rotation_speed: 0.004,
            min_attraction_distance: 10.0,
        }
    }
}

/// Stateless per-frame particle integrator.
#[derive(Debug, Clone, Default)]
pub struct PhysicsIntegrator {
    tuning: IntegratorTuning,
}

impl PhysicsIntegrator {
    /// Creates an integrator.
    #[must_use]
    pub const fn new(tuning: IntegratorTuning) -> Self {
        Self { tuning }
    }

    /// Returns the tuning.
    #[must_use]
    pub const fn tuning(&self) -> &IntegratorTuning {
        &self.tuning
    }

    /// Advances every particle in `pool` by `dt_ms`.
    ///
    /// `bounds` is the viewport size used for bouncing; `None` disables
    /// bouncing. Returns how many particles expired and were removed.
    pub fn update(
        &self,
        pool: &mut SlotPool<Particle>,
        dt_ms: f32,
        bounds: Option<Vec2>,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let dt = sanitize_dt(dt_ms);
        pool.retain_mut(|particle| self.step(particle, dt, bounds, rng))
    }

    /// Advances one particle. Returns false if it expired.
    pub fn step(
        &self,
        particle: &mut Particle,
        dt_ms: f32,
        bounds: Option<Vec2>,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let dt = sanitize_dt(dt_ms);
        let physics = particle.physics;

        if let Some(gravity) = physics.gravity {
            particle.velocity.y += gravity * dt;
        }

        if let Some(friction) = physics.friction {
            // Large dt * friction would flip the velocity
            particle.velocity *= (1.0 - friction * dt).max(0.0);
        }

        if let Some(attractor) = physics.attraction {
            let to_attractor = attractor.point - particle.position;
            let distance_sq = to_attractor.length_squared();
            if distance_sq > f32::EPSILON {
                let min_sq = self.tuning.min_attraction_distance * self.tuning.min_attraction_distance;
                let accel = attractor.strength / distance_sq.max(min_sq);
                particle.velocity += to_attractor * (accel / distance_sq.sqrt() * dt);
            }
        }

        let amplitude = self.tuning.turbulence_amplitude * physics.turbulence;
        if amplitude > 0.0 {
            particle.velocity.x += rng.jitter(amplitude);
            particle.velocity.y += rng.jitter(amplitude);
        }

        particle.life -= dt;
        if particle.is_expired() {
            particle.life = 0.0;
            particle.opacity = 0.0;
            return false;
        }
        particle.life = particle.life.min(particle.max_life);

        particle.position += particle.velocity * dt;

        if let (Some(bounce), Some(bounds)) = (physics.bounce, bounds) {
            bounce_off_edges(particle, bounce, bounds);
        }

        particle.opacity = particle.life_fraction();
        if particle.flags.rotate {
            particle.rotation = (particle.rotation + self.tuning.rotation_speed * dt) % TAU;
        }
        if particle.flags.scale {
            particle.scale = particle.opacity;
        }
        true
    }
}

/// Negative and NaN frame deltas count as zero.
#[inline]
pub(crate) fn sanitize_dt(dt_ms: f32) -> f32 {
    if dt_ms.is_finite() {
        dt_ms.max(0.0)
    } else {
        0.0
    }
}

fn bounce_off_edges(particle: &mut Particle, bounce: f32, bounds: Vec2) {
    let position = &mut particle.position;
    let velocity = &mut particle.velocity;

    if position.x < 0.0 {
        position.x = 0.0;
        velocity.x = velocity.x.abs() * bounce;
    } else if position.x > bounds.x {
        position.x = bounds.x;
        velocity.x = -velocity.x.abs() * bounce;
    }

    if position.y < 0.0 {
        position.y = 0.0;
        velocity.y = velocity.y.abs() * bounce;
    } else if position.y > bounds.y {
        position.y = bounds.y;
        velocity.y = -velocity.y.abs() * bounce;
    }
}
