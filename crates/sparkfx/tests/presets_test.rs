//! Every built-in preset runs, draws and completes.

use std::cell::Cell;
use std::rc::Rc;

use sparkfx::{EffectEngine, EffectError, EngineConfig, NormalizedPosition, PresetRegistry};
use sparkfx_render::CommandRecorder;

#[test]
fn test_every_builtin_preset_completes() {
    let registry = PresetRegistry::builtin().unwrap();
    let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    let mut engine = EffectEngine::new(EngineConfig::seeded(99), registry, (1024.0, 768.0));
    let mut surface = CommandRecorder::new(1024.0, 768.0);

    for name in &names {
        let calls = Rc::new(Cell::new(0));
        let hook = Rc::clone(&calls);
        let handle = engine
            .start(
                name.as_str(),
                NormalizedPosition::new(0.3, 0.6),
                Some(Box::new(move || hook.set(hook.get() + 1))),
            )
            .unwrap();

        let mut drew = false;
        // 20 s of frames covers the longest duration plus drain
        for _ in 0..1250 {
            surface.begin_frame();
            engine.frame(16.0, Some(&mut surface));
            drew |= surface.command_count() > 1;
        }

        assert!(drew, "{name} never drew");
        assert_eq!(calls.get(), 1, "{name}");
        assert!(!engine.is_running(handle));
    }
}

#[test]
fn test_host_presets_extend_builtins() {
    let mut engine = EffectEngine::with_builtin_presets(EngineConfig::seeded(3), (800.0, 600.0)).unwrap();
    engine
        .presets_mut()
        .extend_from_toml(
            r##"
            [presets.level-up]
            preset_type = "sparkle-rain"
            intensity = "ultra"
            duration_ms = 800.0
            initial_particle_count = 30
            palette = ["#00ff00", "#ffffffcc"]

            [presets.level-up.performance]
            max_particles = 30
            "##,
        )
        .unwrap();

    let handle = engine
        .start("level-up", NormalizedPosition::CENTER, None)
        .unwrap();
    let readout = engine.readout(handle).unwrap();
    assert_eq!(readout.live_particle_count, 30);
    assert_eq!(readout.current_cap, 30);

    assert!(matches!(
        engine.start("level-down", NormalizedPosition::CENTER, None),
        Err(EffectError::UnknownPreset(_))
    ));
}
