//! Friction settles velocities; attraction gathers positions.

use sparkfx::metrics::{position_dispersion, velocity_dispersion};
use sparkfx::{
    AttractionSettings, EffectEngine, EffectHandle, EngineConfig, NormalizedPosition,
    ParticleSystemConfig, PhysicsSettings, SampleRange,
};

const FRAME_MS: f32 = 16.0;

fn engine(seed: u64) -> EffectEngine {
    EffectEngine::new(EngineConfig::seeded(seed), Default::default(), (800.0, 600.0))
}

/// A single burst: no top-up, long-lived particles, no jitter.
fn burst(physics: PhysicsSettings, speed_range: SampleRange) -> ParticleSystemConfig {
    ParticleSystemConfig {
        duration_ms: 0.0,
        initial_particle_count: 50,
        physics,
        speed_range,
        life_range: SampleRange::new(5000.0, 6000.0),
        ..Default::default()
    }
}

fn run(engine: &mut EffectEngine, frames: usize) {
    for _ in 0..frames {
        engine.frame(FRAME_MS, None);
    }
}

fn velocity_spread(engine: &EffectEngine, handle: EffectHandle) -> f32 {
    velocity_dispersion(engine.session(handle).unwrap().particles())
}

fn position_spread(engine: &EffectEngine, handle: EffectHandle) -> f32 {
    position_dispersion(engine.session(handle).unwrap().particles())
}

#[test]
fn test_friction_settles_velocity_spread() {
    let mut engine = engine(21);
    let config = burst(
        PhysicsSettings {
            friction: 0.003,
            turbulence: 0.0,
            ..Default::default()
        },
        SampleRange::new(0.05, 0.3),
    );
    let handle = engine.start(config, NormalizedPosition::CENTER, None).unwrap();

    run(&mut engine, 1);
    let early = velocity_spread(&engine, handle);
    run(&mut engine, 59);
    let late = velocity_spread(&engine, handle);

    assert!(early > 0.0);
    assert!(late < 0.5 * early, "early {early}, late {late}");
}

#[test]
fn test_attraction_gathers_positions() {
    for seed in [31, 32, 33] {
        let mut engine = engine(seed);
        let config = burst(
            PhysicsSettings {
                friction: 0.003,
                turbulence: 0.0,
                attraction: Some(AttractionSettings {
                    strength: 0.01,
                    offset: [0.0, 0.0],
                }),
                ..Default::default()
            },
            SampleRange::new(0.05, 0.1),
        );
        let handle = engine.start(config, NormalizedPosition::CENTER, None).unwrap();

        // ~250 ms
        run(&mut engine, 16);
        let early = position_spread(&engine, handle);
        // ~3000 ms
        run(&mut engine, 172);
        let late = position_spread(&engine, handle);

        assert_eq!(engine.session(handle).unwrap().live_count(), 50);
        assert!(late < 0.6 * early, "seed {seed}: early {early}, late {late}");
    }
}

#[test]
fn test_without_attraction_burst_keeps_spreading() {
    let mut engine = engine(41);
    let config = burst(
        PhysicsSettings {
            turbulence: 0.0,
            ..Default::default()
        },
        SampleRange::new(0.05, 0.1),
    );
    let handle = engine.start(config, NormalizedPosition::CENTER, None).unwrap();

    run(&mut engine, 16);
    let early = position_spread(&engine, handle);
    run(&mut engine, 60);
    let late = position_spread(&engine, handle);

    assert!(late > early);
}
