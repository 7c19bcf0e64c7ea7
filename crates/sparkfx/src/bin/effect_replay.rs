//! # Effect Replay
//!
//! Runs one effect headless against a command recorder and prints the
//! debug readout as it goes. Useful for tuning presets without a browser.
//!
//! ```text
//! effect_replay fire-storm --frame-ms 33 --seed 7
//! effect_replay --list
//! ```

use std::cell::Cell;
use std::rc::Rc;

use sparkfx::{EffectEngine, EngineConfig, NormalizedPosition};
use sparkfx_render::{CommandRecorder, DrawCommand};

const VIEWPORT: (f32, f32) = (800.0, 600.0);

fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         SPARKFX EFFECT REPLAY                                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    let seed: u64 = flag_value(&args, "--seed").unwrap_or(7);
    let engine = EffectEngine::with_builtin_presets(EngineConfig::seeded(seed), VIEWPORT);
    let mut engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            println!("Error: could not load presets: {e}");
            return;
        }
    };

    if args.len() < 2 || args.iter().any(|a| a == "--list") {
        println!("Usage: effect_replay <preset> [--frames N] [--frame-ms MS] [--seed S]");
        println!();
        println!("Presets:");
        for name in engine.presets().names() {
            println!("  {name}");
        }
        return;
    }

    let preset = &args[1];
    let max_frames: usize = flag_value(&args, "--frames").unwrap_or(1200);
    let frame_ms: f32 = flag_value(&args, "--frame-ms").unwrap_or(16.0);

    let completed = Rc::new(Cell::new(false));
    let hook = Rc::clone(&completed);
    let handle = match engine.start(
        preset.as_str(),
        NormalizedPosition::CENTER,
        Some(Box::new(move || hook.set(true))),
    ) {
        Ok(handle) => handle,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    let mut surface = CommandRecorder::new(VIEWPORT.0, VIEWPORT.1);
    println!("Replaying '{preset}' at {frame_ms} ms/frame (seed {seed})");
    println!();
    println!("┌─ FRAMES ─────────────────────────────────────────────────────────┐");

    let mut frames = 0;
    let mut peak_live = 0;
    let mut total_commands = 0;
    while frames < max_frames && engine.is_running(handle) {
        surface.begin_frame();
        engine.frame(frame_ms, Some(&mut surface));
        frames += 1;
        total_commands += surface.command_count();

        if let Some(readout) = engine.readout(handle) {
            peak_live = peak_live.max(readout.live_particle_count);
            if frames % 30 == 0 {
                let shapes = surface.count_where(|c| matches!(c, DrawCommand::Save));
                println!(
                    "│ frame {frames:>5} | {readout} | {:?} | {shapes} drawn",
                    readout.state
                );
            }
        }
    }

    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ SUMMARY ────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {frames}");
    println!("│ Simulated time:     {:.0} ms", frames as f32 * frame_ms);
    println!("│ Peak particles:     {peak_live}");
    println!("│ Draw commands:      {total_commands}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    if completed.get() {
        println!("✓ Effect completed");
    } else {
        println!("⚠ Effect still running after {frames} frames");
    }
}
