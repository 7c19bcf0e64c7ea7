//! # Effect Session
//!
//! One running effect, from trigger to completion.
//!
//! ```text
//!            start                 elapsed >= duration           pool empty
//!   Idle ─────────────► Active ────────────────────► Draining ──────────────► Idle
//!    ▲                    │                             │       (on_complete)
//!    └──── cancel ────────┴─────────── cancel ──────────┘
//!                    (no callback)
//! ```
//!
//! Frame order:
//!
//! 1. physics (expired particles removed)
//! 2. adaptive cap update
//! 3. state transition
//! 4. top-up spawn (Active only)
//! 5. cull down to the cap
//! 6. draw (if a usable surface was given)
//! 7. completion check
//!
//! All particle storage is sized in [`start`](EffectSession::start); the
//! frame path does not allocate.

use std::fmt;
use std::sync::Arc;

use sparkfx_core::{RandomSource, SlotHandle, SlotPool, Vec2};
use sparkfx_render::{DrawSurface, InstanceBuffer};
use tracing::{debug, info, trace, warn};

use crate::config::ParticleSystemConfig;
use crate::factory::ParticleFactory;
use crate::particle::Particle;
use crate::physics::{sanitize_dt, PhysicsIntegrator};
use crate::quality::{AdaptiveQualityController, QualityTuning};
use crate::render::TypeRenderer;
use crate::tuning::EngineConfig;

/// Invoked once when an effect finishes on its own.
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing running.
    Idle,
    /// Spawning and simulating.
    Active,
    /// Duration over; waiting for the last particles to die.
    Draining,
}

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Session was idle; nothing happened.
    Idle,
    /// Effect still running.
    Running,
    /// Effect finished this frame and its callback ran.
    Completed,
}

/// Live counters for a debug overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugReadout {
    /// Live particles.
    pub live_particle_count: usize,
    /// Current particle cap.
    pub current_cap: usize,
    /// Smoothed frames per second.
    pub smoothed_fps: f32,
    /// Current quality scalar.
    pub quality: f32,
    /// Lifecycle state.
    pub state: SessionState,
}

impl fmt::Display for DebugReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "particles {}/{} | {:.1} fps | quality {:.2}",
            self.live_particle_count, self.current_cap, self.smoothed_fps, self.quality
        )
    }
}

/// A single effect instance.
pub struct EffectSession {
    state: SessionState,
    config: Option<Arc<ParticleSystemConfig>>,
    pool: SlotPool<Particle>,
    factory: ParticleFactory,
    integrator: PhysicsIntegrator,
    renderer: TypeRenderer,
    quality_tuning: QualityTuning,
    particle_limit: usize,
    controller: AdaptiveQualityController,
    cap: usize,
    elapsed_ms: f32,
    spawn_point: Vec2,
    viewport: Vec2,
    rng: Box<dyn RandomSource>,
    on_complete: Option<CompletionCallback>,
    /// (remaining life, slot) pairs reused by culling.
    cull_scratch: Vec<(f32, SlotHandle)>,
}

impl fmt::Debug for EffectSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSession")
            .field("state", &self.state)
            .field("live", &self.pool.len())
            .field("cap", &self.cap)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("spawn_point", &self.spawn_point)
            .finish_non_exhaustive()
    }
}

impl EffectSession {
    /// Creates an idle session drawing randomness from `rng`.
    #[must_use]
    pub fn new(tuning: &EngineConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            state: SessionState::Idle,
            config: None,
            pool: SlotPool::new(0),
            factory: ParticleFactory::new(),
            integrator: PhysicsIntegrator::new(tuning.integrator),
            renderer: TypeRenderer::new(tuning.renderer),
            quality_tuning: tuning.quality,
            particle_limit: tuning.limits.max_particles_per_effect,
            controller: AdaptiveQualityController::new(tuning.quality, 0, 1.0),
            cap: 0,
            elapsed_ms: 0.0,
            spawn_point: Vec2::ZERO,
            viewport: Vec2::ZERO,
            rng,
            on_complete: None,
            cull_scratch: Vec::new(),
        }
    }

    /// Starts the effect at `spawn_point` (pixels).
    ///
    /// `viewport` is the drawable size used for bouncing. Starting a
    /// running session cancels it first; its callback is dropped.
    pub fn start(
        &mut self,
        config: Arc<ParticleSystemConfig>,
        spawn_point: Vec2,
        viewport: Vec2,
        on_complete: Option<CompletionCallback>,
    ) {
        if self.state != SessionState::Idle {
            debug!("restarting a running effect");
            self.cancel();
        }

        for issue in config.degeneracies() {
            warn!(preset = ?config.preset_type, issue, "degenerate effect config");
        }

        let max = config.performance.max_particles.min(self.particle_limit);
        if max < config.performance.max_particles {
            warn!(
                requested = config.performance.max_particles,
                limit = self.particle_limit,
                "max_particles clamped to the per-effect limit"
            );
        }
        self.pool = SlotPool::new(max);
        self.cull_scratch = Vec::with_capacity(max);
        self.controller =
            AdaptiveQualityController::new(self.quality_tuning, max, config.performance.quality_tier);
        self.cap = max;
        self.elapsed_ms = 0.0;
        self.spawn_point = spawn_point;
        self.viewport = viewport;
        self.on_complete = on_complete;

        let spawned = self.factory.spawn_into(
            &mut self.pool,
            &config,
            spawn_point,
            config.initial_count().min(self.cap),
            self.rng.as_mut(),
        );
        self.state = SessionState::Active;

        info!(
            preset = ?config.preset_type,
            spawned,
            max_particles = max,
            duration_ms = config.duration_ms,
            "effect started"
        );
        self.config = Some(config);
    }

    /// Advances the effect by `dt_ms` and draws it.
    ///
    /// `frame_time_ms` is the measured duration of the previous frame and
    /// feeds the adaptive controller. With no surface, or a zero-sized one,
    /// the effect keeps simulating and still completes.
    pub fn frame(
        &mut self,
        dt_ms: f32,
        frame_time_ms: f32,
        surface: Option<&mut (dyn DrawSurface + '_)>,
    ) -> FrameStatus {
        if self.state == SessionState::Idle {
            return FrameStatus::Idle;
        }
        let Some(config) = self.config.clone() else {
            return FrameStatus::Idle;
        };

        let dt = sanitize_dt(dt_ms);
        self.elapsed_ms += dt;

        let bounds = self.bounce_bounds();
        let expired = self
            .integrator
            .update(&mut self.pool, dt, bounds, self.rng.as_mut());

        if config.performance.adaptive_enabled {
            self.cap = self.controller.tick(frame_time_ms, self.cap);
        } else {
            self.controller.observe(frame_time_ms);
        }

        if self.state == SessionState::Active && self.elapsed_ms >= config.duration_ms {
            self.state = SessionState::Draining;
            debug!(elapsed_ms = self.elapsed_ms, live = self.pool.len(), "effect draining");
        }

        let mut spawned = 0;
        if self.state == SessionState::Active {
            let room = self.cap.saturating_sub(self.pool.len());
            if room > 0 {
                spawned = self.factory.spawn_into(
                    &mut self.pool,
                    &config,
                    self.spawn_point,
                    room,
                    self.rng.as_mut(),
                );
            }
        }

        let culled = self.enforce_cap();

        if let Some(surface) = surface {
            if surface.is_ready() {
                let quality = self.controller.quality();
                for particle in self.pool.values() {
                    self.renderer.draw(surface, particle, self.elapsed_ms, quality);
                }
            }
        }

        trace!(
            live = self.pool.len(),
            cap = self.cap,
            expired,
            spawned,
            culled,
            "effect frame"
        );

        if self.state == SessionState::Draining && self.pool.is_empty() {
            self.finish();
            return FrameStatus::Completed;
        }
        FrameStatus::Running
    }

    /// Stops the effect immediately. The completion callback is dropped
    /// without being called.
    ///
    /// Returns false if the session was already idle.
    pub fn cancel(&mut self) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }
        self.on_complete = None;
        let live = self.pool.len();
        self.release();
        debug!(live, "effect cancelled");
        true
    }

    /// Updates the viewport used for bouncing.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Exports live particles into an instance buffer (cleared first).
    pub fn write_instances(&self, buffer: &mut InstanceBuffer) {
        buffer.clear();
        self.append_instances(buffer);
    }

    /// Appends live particles to an instance buffer.
    pub fn append_instances(&self, buffer: &mut InstanceBuffer) {
        for particle in self.pool.values() {
            buffer.push(self.renderer.instance(particle, self.elapsed_ms));
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true unless idle.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Counters for a debug overlay.
    #[must_use]
    pub fn debug_readout(&self) -> DebugReadout {
        DebugReadout {
            live_particle_count: self.pool.len(),
            current_cap: self.cap,
            smoothed_fps: self.controller.smoothed_fps(),
            quality: self.controller.quality(),
            state: self.state,
        }
    }

    /// Live particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.pool.values()
    }

    /// Number of live particles.
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.pool.len()
    }

    /// Current particle cap.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Milliseconds since start.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Spawn point in pixels.
    #[must_use]
    pub const fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    /// The running config, if any.
    #[must_use]
    pub fn config(&self) -> Option<&Arc<ParticleSystemConfig>> {
        self.config.as_ref()
    }

    fn bounce_bounds(&self) -> Option<Vec2> {
        (self.viewport.x > 0.0 && self.viewport.y > 0.0).then_some(self.viewport)
    }

    /// Frees the particles with the least remaining life until the live
    /// count fits the cap. Returns how many were freed.
    fn enforce_cap(&mut self) -> usize {
        let live = self.pool.len();
        if live <= self.cap {
            return 0;
        }
        let excess = live - self.cap;

        self.cull_scratch.clear();
        self.cull_scratch
            .extend(self.pool.iter().map(|(handle, p)| (p.life, handle)));
        self.cull_scratch
            .select_nth_unstable_by(excess - 1, |a, b| a.0.total_cmp(&b.0));

        for &(_, handle) in &self.cull_scratch[..excess] {
            self.pool.free(handle);
        }
        debug!(culled = excess, cap = self.cap, "culled particles over cap");
        excess
    }

    fn finish(&mut self) {
        let callback = self.on_complete.take();
        let elapsed_ms = self.elapsed_ms;
        self.release();
        info!(elapsed_ms, "effect complete");
        if let Some(callback) = callback {
            callback();
        }
    }

    fn release(&mut self) {
        self.state = SessionState::Idle;
        self.config = None;
        self.pool = SlotPool::new(0);
        self.cull_scratch = Vec::new();
        self.cap = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PerformanceSettings, SampleRange};
    use sparkfx_core::SeededRandom;
    use sparkfx_render::{Color, CommandRecorder, DrawCommand};
    use std::cell::Cell;
    use std::rc::Rc;

    fn session(seed: u64) -> EffectSession {
        EffectSession::new(&EngineConfig::default(), Box::new(SeededRandom::from_seed(seed)))
    }

    fn config(duration_ms: f32, initial: i64, max: usize) -> Arc<ParticleSystemConfig> {
        Arc::new(ParticleSystemConfig {
            duration_ms,
            initial_particle_count: initial,
            palette: vec![Color::GOLD],
            life_range: SampleRange::new(100.0, 200.0),
            performance: PerformanceSettings {
                max_particles: max,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn counter() -> (Rc<Cell<u32>>, CompletionCallback) {
        let calls = Rc::new(Cell::new(0));
        let hook = Rc::clone(&calls);
        (calls, Box::new(move || hook.set(hook.get() + 1)))
    }

    #[test]
    fn test_lifecycle_states() {
        let mut session = session(1);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.frame(16.0, 16.0, None), FrameStatus::Idle);

        session.start(config(100.0, 20, 50), Vec2::new(10.0, 10.0), Vec2::ZERO, None);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.live_count(), 20);

        let mut saw_draining = false;
        for _ in 0..100 {
            match session.frame(16.0, 16.0, None) {
                FrameStatus::Completed => break,
                FrameStatus::Running => {
                    if session.state() == SessionState::Draining {
                        saw_draining = true;
                    }
                }
                FrameStatus::Idle => panic!("went idle without completing"),
            }
        }
        assert!(saw_draining);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.live_count(), 0);
    }

    #[test]
    fn test_active_tops_up_to_cap() {
        let mut session = session(2);
        session.start(config(10_000.0, 5, 40), Vec2::ZERO, Vec2::ZERO, None);
        assert_eq!(session.live_count(), 5);

        session.frame(16.0, 16.0, None);
        assert_eq!(session.live_count(), 40);
    }

    #[test]
    fn test_pool_clamped_to_particle_limit() {
        let mut tuning = EngineConfig::default();
        tuning.limits.max_particles_per_effect = 64;
        let mut session = EffectSession::new(&tuning, Box::new(SeededRandom::from_seed(8)));

        session.start(config(1000.0, 500, usize::MAX), Vec2::ZERO, Vec2::ZERO, None);
        assert_eq!(session.cap(), 64);
        assert_eq!(session.live_count(), 64);
    }

    #[test]
    fn test_cancel_suppresses_callback() {
        let (calls, hook) = counter();
        let mut session = session(3);
        session.start(config(50.0, 10, 10), Vec2::ZERO, Vec2::ZERO, Some(hook));

        assert!(session.cancel());
        assert!(!session.cancel());
        assert_eq!(session.live_count(), 0);
        for _ in 0..50 {
            assert_eq!(session.frame(16.0, 16.0, None), FrameStatus::Idle);
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_callback_runs_once() {
        let (calls, hook) = counter();
        let mut session = session(4);
        session.start(config(50.0, 10, 10), Vec2::ZERO, Vec2::ZERO, Some(hook));

        for _ in 0..100 {
            session.frame(16.0, 16.0, None);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cull_removes_shortest_lived() {
        let mut session = session(5);
        let mut cfg = (*config(10_000.0, 30, 30)).clone();
        cfg.life_range = SampleRange::new(1000.0, 5000.0);
        session.start(Arc::new(cfg), Vec2::ZERO, Vec2::ZERO, None);

        let mut lives: Vec<f32> = session.particles().map(|p| p.life).collect();
        lives.sort_by(f32::total_cmp);
        let threshold = lives[10];

        session.cap = 20;
        assert_eq!(session.enforce_cap(), 10);
        assert_eq!(session.live_count(), 20);
        assert!(session.particles().all(|p| p.life >= threshold));
    }

    #[test]
    fn test_draws_only_with_ready_surface() {
        let mut session = session(6);
        session.start(config(10_000.0, 10, 10), Vec2::new(50.0, 50.0), Vec2::ZERO, None);

        let mut absent = CommandRecorder::default();
        session.frame(16.0, 16.0, Some(&mut absent));
        assert_eq!(absent.command_count(), 0);

        let mut recorder = CommandRecorder::new(100.0, 100.0);
        session.frame(16.0, 16.0, Some(&mut recorder));
        assert_eq!(
            recorder.count_where(|c| matches!(c, DrawCommand::Save)),
            session.live_count()
        );
    }

    #[test]
    fn test_instances_match_live_particles() {
        let mut session = session(7);
        session.start(config(10_000.0, 12, 12), Vec2::ZERO, Vec2::ZERO, None);

        let mut buffer = InstanceBuffer::with_capacity(12);
        session.write_instances(&mut buffer);
        assert_eq!(buffer.len(), 12);
    }

    #[test]
    fn test_readout() {
        let mut session = session(8);
        session.start(config(10_000.0, 10, 25), Vec2::ZERO, Vec2::ZERO, None);
        session.frame(20.0, 20.0, None);

        let readout = session.debug_readout();
        assert_eq!(readout.live_particle_count, 25);
        assert_eq!(readout.current_cap, 25);
        assert!((readout.smoothed_fps - 50.0).abs() < 1e-3);
        assert_eq!(readout.to_string(), "particles 25/25 | 50.0 fps | quality 1.00");
    }
}
