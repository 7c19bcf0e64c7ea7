//! # Particle Factory
//!
//! Turns a config and a spawn point into particles. Spawn directions are
//! spread evenly around the circle and then jittered, so a burst reads as
//! a ring rather than a clump.

use std::f32::consts::TAU;

use sparkfx_core::{RandomSource, SlotPool, Vec2};
use sparkfx_render::Color;

use crate::config::ParticleSystemConfig;
use crate::particle::{Attractor, Particle, ParticleId, PhysicsParams, VisualType};

/// Default angular jitter around each evenly spaced direction (radians).
pub const DEFAULT_DIRECTION_JITTER: f32 = 0.2;

/// Creates particles with unique, increasing ids.
#[derive(Debug, Clone)]
pub struct ParticleFactory {
    next_id: u64,
    direction_jitter: f32,
}

impl Default for ParticleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleFactory {
    /// Creates a factory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            direction_jitter: DEFAULT_DIRECTION_JITTER,
        }
    }

    /// Overrides the direction jitter.
    #[must_use]
    pub fn with_direction_jitter(mut self, jitter: f32) -> Self {
        self.direction_jitter = jitter.max(0.0);
        self
    }

    /// Number of particles created so far.
    #[must_use]
    pub const fn spawned(&self) -> u64 {
        self.next_id
    }

    /// Creates up to `count` particles around `spawn_point`.
    ///
    /// The count is clamped to `max_particles`. An empty palette yields
    /// nothing. Allocates; the frame path uses [`spawn_into`](Self::spawn_into).
    pub fn spawn(
        &mut self,
        config: &ParticleSystemConfig,
        spawn_point: Vec2,
        count: usize,
        rng: &mut dyn RandomSource,
    ) -> Vec<Particle> {
        let count = count.min(config.performance.max_particles);
        if config.palette.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|i| self.build(config, spawn_point, i, count, rng))
            .collect()
    }

    /// Creates up to `count` particles directly into `pool`.
    ///
    /// Stops early when the pool is full. Returns how many were created.
    pub fn spawn_into(
        &mut self,
        pool: &mut SlotPool<Particle>,
        config: &ParticleSystemConfig,
        spawn_point: Vec2,
        count: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let count = count
            .min(config.performance.max_particles)
            .min(pool.free_count());
        if config.palette.is_empty() {
            return 0;
        }
        let mut created = 0;
        for i in 0..count {
            let particle = self.build(config, spawn_point, i, count, rng);
            if pool.allocate(particle).is_none() {
                break;
            }
            created += 1;
        }
        created
    }

    fn build(
        &mut self,
        config: &ParticleSystemConfig,
        spawn_point: Vec2,
        index: usize,
        count: usize,
        rng: &mut dyn RandomSource,
    ) -> Particle {
        let id = ParticleId(self.next_id);
        self.next_id += 1;

        let base_angle = TAU * index as f32 / count.max(1) as f32;
        let angle = base_angle + rng.jitter(self.direction_jitter);
        let speed = config.speed_range.sample(rng);
        let size = config.size_range.sample(rng).max(0.0);
        let life = config.life_range.sample(rng).max(0.0);
        let color = rng
            .index(config.palette.len())
            .map_or(Color::WHITE, |i| config.palette[i]);

        let rotation = if config.effects.rotate {
            rng.range(0.0, TAU)
        } else {
            0.0
        };

        Particle {
            id,
            position: spawn_point,
            velocity: Vec2::from_angle(angle) * speed,
            life,
            max_life: life,
            size,
            color,
            visual_type: VisualType::from_preset(config.preset_type),
            intensity: config.intensity.multiplier(),
            physics: physics_params(config, spawn_point),
            flags: config.effects,
            opacity: if life > 0.0 { 1.0 } else { 0.0 },
            rotation,
            scale: 1.0,
        }
    }
}

fn physics_params(config: &ParticleSystemConfig, spawn_point: Vec2) -> PhysicsParams {
    let physics = &config.physics;
    let nonzero = |v: f32| (v != 0.0).then_some(v);
    PhysicsParams {
        gravity: nonzero(physics.gravity),
        friction: nonzero(physics.friction),
        bounce: (physics.bounce > 0.0).then_some(physics.bounce),
        turbulence: physics.turbulence.max(0.0),
        attraction: physics
            .attraction
            .filter(|a| a.strength != 0.0)
            .map(|a| Attractor {
                point: spawn_point + Vec2::from_array(a.offset),
                strength: a.strength,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttractionSettings, PerformanceSettings, SampleRange};
    use sparkfx_core::random::ConstantRandom;
    use sparkfx_core::SeededRandom;

    fn config() -> ParticleSystemConfig {
        ParticleSystemConfig {
            palette: vec![Color::GOLD, Color::WHITE],
            size_range: SampleRange::new(2.0, 4.0),
            speed_range: SampleRange::new(0.1, 0.2),
            life_range: SampleRange::new(500.0, 900.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_ranges_and_ids() {
        let mut factory = ParticleFactory::new();
        let mut rng = SeededRandom::from_seed(1);
        let center = Vec2::new(400.0, 300.0);

        let particles = factory.spawn(&config(), center, 40, &mut rng);
        assert_eq!(particles.len(), 40);

        for (i, p) in particles.iter().enumerate() {
            assert_eq!(p.id, ParticleId(i as u64));
            assert_eq!(p.position, center);
            assert_eq!(p.life, p.max_life);
            assert!((500.0..=900.0).contains(&p.life));
            assert!((2.0..=4.0).contains(&p.size));
            let speed = p.velocity.length();
            assert!((0.099..=0.201).contains(&speed), "speed {speed}");
            assert_eq!(p.opacity, 1.0);
        }

        let more = factory.spawn(&config(), center, 1, &mut rng);
        assert_eq!(more[0].id, ParticleId(40));
    }

    #[test]
    fn test_directions_spread_evenly_without_jitter() {
        let mut factory = ParticleFactory::new();
        let mut rng = ConstantRandom(0.5);
        let particles = factory.spawn(&config(), Vec2::ZERO, 4, &mut rng);

        // 0, 90, 180, 270 degrees
        assert!(particles[0].velocity.x > 0.0 && particles[0].velocity.y.abs() < 1e-6);
        assert!(particles[1].velocity.y > 0.0 && particles[1].velocity.x.abs() < 1e-6);
        assert!(particles[2].velocity.x < 0.0);
        assert!(particles[3].velocity.y < 0.0);
    }

    #[test]
    fn test_count_clamped_to_max_particles() {
        let mut factory = ParticleFactory::new();
        let mut rng = SeededRandom::from_seed(2);
        let cfg = ParticleSystemConfig {
            performance: PerformanceSettings {
                max_particles: 12,
                ..Default::default()
            },
            ..config()
        };

        assert_eq!(factory.spawn(&cfg, Vec2::ZERO, 500, &mut rng).len(), 12);
    }

    #[test]
    fn test_empty_palette_spawns_nothing() {
        let mut factory = ParticleFactory::new();
        let mut rng = SeededRandom::from_seed(3);
        let cfg = ParticleSystemConfig {
            palette: Vec::new(),
            ..config()
        };

        assert!(factory.spawn(&cfg, Vec2::ZERO, 10, &mut rng).is_empty());
        let mut pool = SlotPool::new(10);
        assert_eq!(factory.spawn_into(&mut pool, &cfg, Vec2::ZERO, 10, &mut rng), 0);
    }

    #[test]
    fn test_spawn_into_stops_at_pool_capacity() {
        let mut factory = ParticleFactory::new();
        let mut rng = SeededRandom::from_seed(4);
        let mut pool = SlotPool::new(5);

        let created = factory.spawn_into(&mut pool, &config(), Vec2::ZERO, 20, &mut rng);
        assert_eq!(created, 5);
        assert!(pool.is_full());
    }

    #[test]
    fn test_attractor_resolved_relative_to_spawn() {
        let mut factory = ParticleFactory::new();
        let mut rng = SeededRandom::from_seed(5);
        let mut cfg = config();
        cfg.physics.attraction = Some(AttractionSettings {
            strength: 0.02,
            offset: [10.0, -5.0],
        });

        let p = &factory.spawn(&cfg, Vec2::new(100.0, 100.0), 1, &mut rng)[0];
        let attractor = p.physics.attraction.unwrap();
        assert_eq!(attractor.point, Vec2::new(110.0, 95.0));
        assert_eq!(p.physics.gravity, None);
        assert_eq!(p.physics.friction, None);
    }
}
