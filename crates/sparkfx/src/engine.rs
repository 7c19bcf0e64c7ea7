//! # Effect Engine
//!
//! Hosts any number of concurrent effects on one surface. The host calls
//! [`EffectEngine::frame`] once per display refresh; the engine clears the
//! surface, advances and draws every session, and drops finished ones.
//!
//! ```rust,ignore
//! let mut engine = EffectEngine::with_builtin_presets(EngineConfig::default(), (800.0, 600.0))?;
//! let handle = engine.start("fire-storm", NormalizedPosition::CENTER, None)?;
//! loop {
//!     engine.frame(16.0, Some(&mut surface));
//! }
//! ```

use std::sync::Arc;

use sparkfx_core::{SeededRandom, Vec2};
use sparkfx_render::{DrawSurface, InstanceBuffer};
use tracing::{debug, info, warn};

use crate::config::ParticleSystemConfig;
use crate::error::{EffectError, EffectResult};
use crate::presets::PresetRegistry;
use crate::session::{CompletionCallback, DebugReadout, EffectSession, FrameStatus};
use crate::tuning::EngineConfig;

/// Identifies a started effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(u64);

impl EffectHandle {
    /// Raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Position as a fraction of the viewport, `(0, 0)` top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPosition {
    /// Horizontal fraction in `[0, 1]`.
    pub x: f32,
    /// Vertical fraction in `[0, 1]`.
    pub y: f32,
}

impl NormalizedPosition {
    /// Viewport center.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Creates a position, clamping both coordinates to `[0, 1]`.
    ///
    /// Non-finite coordinates fall back to the center.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        let fix = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self { x: fix(x), y: fix(y) }
    }

    /// Converts to pixels for a viewport of the given size.
    #[must_use]
    pub fn to_pixels(self, viewport: Vec2) -> Vec2 {
        Vec2::new(self.x, self.y).scale(viewport)
    }
}

impl Default for NormalizedPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

/// What to start: a registered preset or an explicit config.
#[derive(Debug, Clone)]
pub enum EffectSource {
    /// Preset name.
    Preset(String),
    /// Explicit config.
    Config(Arc<ParticleSystemConfig>),
}

impl From<&str> for EffectSource {
    fn from(name: &str) -> Self {
        Self::Preset(name.to_string())
    }
}

impl From<String> for EffectSource {
    fn from(name: String) -> Self {
        Self::Preset(name)
    }
}

impl From<ParticleSystemConfig> for EffectSource {
    fn from(config: ParticleSystemConfig) -> Self {
        Self::Config(Arc::new(config))
    }
}

impl From<Arc<ParticleSystemConfig>> for EffectSource {
    fn from(config: Arc<ParticleSystemConfig>) -> Self {
        Self::Config(config)
    }
}

/// Totals across all running effects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineReadout {
    /// Running effects.
    pub active_effects: usize,
    /// Live particles over all effects.
    pub live_particle_count: usize,
    /// Sum of per-effect caps.
    pub total_cap: usize,
    /// Smoothed FPS (0 with no effects running).
    pub smoothed_fps: f32,
}

/// Multi-effect host.
#[derive(Debug)]
pub struct EffectEngine {
    config: EngineConfig,
    presets: PresetRegistry,
    sessions: Vec<(EffectHandle, EffectSession)>,
    next_handle: u64,
    viewport: Vec2,
    rng: SeededRandom,
}

fn clamp_viewport(width: f32, height: f32) -> Vec2 {
    let fix = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Vec2::new(fix(width), fix(height))
}

impl EffectEngine {
    /// Creates an engine with the given tuning and presets.
    ///
    /// `viewport` is the surface size in pixels that effects started before
    /// the first frame are positioned against. Later frames adopt the size
    /// of the surface they draw on.
    #[must_use]
    pub fn new(config: EngineConfig, presets: PresetRegistry, viewport: (f32, f32)) -> Self {
        let rng = match config.limits.seed {
            Some(seed) => SeededRandom::from_seed(seed),
            None => SeededRandom::from_entropy(),
        };
        info!(
            presets = presets.len(),
            max_sessions = config.limits.max_sessions,
            seeded = config.limits.seed.is_some(),
            "effect engine ready"
        );
        Self {
            sessions: Vec::with_capacity(config.limits.max_sessions),
            config,
            presets,
            next_handle: 0,
            viewport: clamp_viewport(viewport.0, viewport.1),
            rng,
        }
    }

    /// Creates an engine with the built-in presets.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled preset data is malformed.
    pub fn with_builtin_presets(config: EngineConfig, viewport: (f32, f32)) -> EffectResult<Self> {
        Ok(Self::new(config, PresetRegistry::builtin()?, viewport))
    }

    /// Starts an effect at `position`.
    ///
    /// `on_complete` runs exactly once if the effect finishes on its own,
    /// and never if it is cancelled.
    ///
    /// # Errors
    ///
    /// - [`EffectError::UnknownPreset`] for an unregistered name
    /// - [`EffectError::InvalidConfig`] for a config with non-finite values,
    ///   or one allowing more particles than `limits.max_particles_per_effect`
    /// - [`EffectError::SessionLimit`] when too many effects are running
    pub fn start(
        &mut self,
        source: impl Into<EffectSource>,
        position: NormalizedPosition,
        on_complete: Option<CompletionCallback>,
    ) -> EffectResult<EffectHandle> {
        let config = match source.into() {
            EffectSource::Preset(name) => match self.presets.resolve(&name) {
                Ok(config) => config,
                Err(err) => {
                    warn!(preset = %name, "unknown preset requested");
                    return Err(err);
                }
            },
            EffectSource::Config(config) => {
                config.validate().map_err(EffectError::InvalidConfig)?;
                config
            }
        };

        let particle_limit = self.config.limits.max_particles_per_effect;
        if config.performance.max_particles > particle_limit {
            warn!(
                max_particles = config.performance.max_particles,
                particle_limit,
                "effect rejected: too many particles"
            );
            return Err(EffectError::InvalidConfig(format!(
                "performance.max_particles {} exceeds the limit of {particle_limit}",
                config.performance.max_particles
            )));
        }

        let limit = self.config.limits.max_sessions;
        if self.sessions.len() >= limit {
            warn!(limit, "effect rejected: session limit reached");
            return Err(EffectError::SessionLimit { limit });
        }

        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;

        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            warn!(
                width = self.viewport.x,
                height = self.viewport.y,
                "effect started against an empty viewport"
            );
        }

        let mut session = EffectSession::new(&self.config, Box::new(self.rng.fork()));
        session.start(config, position.to_pixels(self.viewport), self.viewport, on_complete);
        self.sessions.push((handle, session));

        debug!(handle = handle.id(), active = self.sessions.len(), "effect registered");
        Ok(handle)
    }

    /// Advances all effects by `dt_ms`, using it as the measured frame time.
    ///
    /// Returns how many effects completed this frame.
    pub fn frame(&mut self, dt_ms: f32, surface: Option<&mut dyn DrawSurface>) -> usize {
        self.frame_timed(dt_ms, dt_ms, surface)
    }

    /// Advances all effects, with a separately measured frame time for the
    /// adaptive controllers.
    ///
    /// A usable surface is cleared first and its size becomes the viewport.
    pub fn frame_timed(
        &mut self,
        dt_ms: f32,
        frame_time_ms: f32,
        mut surface: Option<&mut dyn DrawSurface>,
    ) -> usize {
        if let Some(target) = surface.as_deref_mut() {
            if target.is_ready() {
                let (width, height) = (target.width(), target.height());
                self.set_viewport(width, height);
                target.clear_rect(0.0, 0.0, width, height);
            }
        }

        let mut completed = 0;
        for (_, session) in &mut self.sessions {
            if session.frame(dt_ms, frame_time_ms, surface.as_deref_mut()) == FrameStatus::Completed {
                completed += 1;
            }
        }
        self.sessions.retain(|(_, session)| session.is_running());
        completed
    }

    /// Cancels one effect. Its callback is not called.
    ///
    /// Returns false for unknown or already finished handles.
    pub fn cancel(&mut self, handle: EffectHandle) -> bool {
        let Some(index) = self.sessions.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        let (_, mut session) = self.sessions.swap_remove(index);
        session.cancel()
    }

    /// Cancels every effect. Returns how many were running.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self
            .sessions
            .iter_mut()
            .map(|(_, session)| session.cancel())
            .filter(|&was_running| was_running)
            .count();
        self.sessions.clear();
        cancelled
    }

    /// Sets the viewport size in pixels.
    ///
    /// New effects are positioned against it; running effects bounce off it.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let viewport = clamp_viewport(width, height);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        for (_, session) in &mut self.sessions {
            session.set_viewport(viewport);
        }
        debug!(width, height, "viewport resized");
    }

    /// Current viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Readout for one effect.
    #[must_use]
    pub fn readout(&self, handle: EffectHandle) -> Option<DebugReadout> {
        self.session(handle).map(EffectSession::debug_readout)
    }

    /// Totals across all effects.
    #[must_use]
    pub fn readout_all(&self) -> EngineReadout {
        self.sessions
            .iter()
            .map(|(_, session)| session.debug_readout())
            .fold(
                EngineReadout {
                    active_effects: self.sessions.len(),
                    ..EngineReadout::default()
                },
                |mut total, r| {
                    total.live_particle_count += r.live_particle_count;
                    total.total_cap += r.current_cap;
                    total.smoothed_fps = total.smoothed_fps.max(r.smoothed_fps);
                    total
                },
            )
    }

    /// Exports every live particle into `buffer` (cleared first).
    pub fn write_instances(&self, buffer: &mut InstanceBuffer) {
        buffer.clear();
        for (_, session) in &self.sessions {
            session.append_instances(buffer);
        }
    }

    /// Returns true while the effect is running.
    #[must_use]
    pub fn is_running(&self, handle: EffectHandle) -> bool {
        self.session(handle).is_some_and(EffectSession::is_running)
    }

    /// The session behind a handle.
    #[must_use]
    pub fn session(&self, handle: EffectHandle) -> Option<&EffectSession> {
        self.sessions
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, session)| session)
    }

    /// Number of running effects.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Registered presets.
    #[must_use]
    pub const fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    /// Registered presets, for adding or overriding.
    pub fn presets_mut(&mut self) -> &mut PresetRegistry {
        &mut self.presets
    }

    /// Engine tuning.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkfx_render::{CommandRecorder, DrawCommand};

    fn engine() -> EffectEngine {
        EffectEngine::with_builtin_presets(EngineConfig::seeded(42), (800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_normalized_position_clamps() {
        assert_eq!(NormalizedPosition::new(-1.0, 2.0), NormalizedPosition { x: 0.0, y: 1.0 });
        assert_eq!(NormalizedPosition::new(f32::NAN, 0.25).x, 0.5);
        assert_eq!(
            NormalizedPosition::new(0.25, 0.5).to_pixels(Vec2::new(800.0, 600.0)),
            Vec2::new(200.0, 300.0)
        );
    }

    #[test]
    fn test_unknown_preset_is_error() {
        let mut engine = engine();
        let err = engine.start("confetti", NormalizedPosition::CENTER, None);
        assert!(matches!(err, Err(EffectError::UnknownPreset(_))));
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_session_limit() {
        let mut config = EngineConfig::seeded(1);
        config.limits.max_sessions = 2;
        let mut engine = EffectEngine::with_builtin_presets(config, (800.0, 600.0)).unwrap();

        engine.start("dust-cloud", NormalizedPosition::CENTER, None).unwrap();
        engine.start("dust-cloud", NormalizedPosition::CENTER, None).unwrap();
        assert!(matches!(
            engine.start("dust-cloud", NormalizedPosition::CENTER, None),
            Err(EffectError::SessionLimit { limit: 2 })
        ));
    }

    #[test]
    fn test_start_before_first_frame_uses_initial_viewport() {
        let mut engine = engine();
        let handle = engine
            .start("fire-storm", NormalizedPosition::CENTER, None)
            .unwrap();
        assert_eq!(
            engine.session(handle).unwrap().spawn_point(),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn test_non_finite_viewport_is_empty() {
        let engine = EffectEngine::new(
            EngineConfig::seeded(1),
            PresetRegistry::default(),
            (f32::NAN, -10.0),
        );
        assert_eq!(engine.viewport(), Vec2::ZERO);
    }

    #[test]
    fn test_oversized_particle_pool_rejected() {
        let mut config = EngineConfig::seeded(1);
        config.limits.max_particles_per_effect = 500;
        let mut engine = EffectEngine::with_builtin_presets(config, (800.0, 600.0)).unwrap();
        engine
            .presets_mut()
            .extend_from_toml(
                r"
                [presets.huge.performance]
                max_particles = 9223372036854775807
                ",
            )
            .unwrap();

        assert!(matches!(
            engine.start("huge", NormalizedPosition::CENTER, None),
            Err(EffectError::InvalidConfig(_))
        ));

        let mut explicit = ParticleSystemConfig::default();
        explicit.performance.max_particles = 501;
        assert!(matches!(
            engine.start(explicit, NormalizedPosition::CENTER, None),
            Err(EffectError::InvalidConfig(_))
        ));
        assert_eq!(engine.active_count(), 0);

        let mut at_limit = ParticleSystemConfig::default();
        at_limit.performance.max_particles = 500;
        assert!(engine.start(at_limit, NormalizedPosition::CENTER, None).is_ok());
    }

    #[test]
    fn test_frame_clears_and_tracks_viewport() {
        let mut engine = engine();
        let mut recorder = CommandRecorder::new(640.0, 480.0);

        engine.frame(16.0, Some(&mut recorder));
        assert_eq!(engine.viewport(), Vec2::new(640.0, 480.0));
        assert_eq!(
            recorder.commands().first(),
            Some(&DrawCommand::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 640.0,
                height: 480.0
            })
        );

        let handle = engine
            .start("orb-field", NormalizedPosition::new(0.5, 0.5), None)
            .unwrap();
        assert_eq!(
            engine.session(handle).unwrap().spawn_point(),
            Vec2::new(320.0, 240.0)
        );
    }

    #[test]
    fn test_cancel_and_cancel_all() {
        let mut engine = engine();
        let a = engine.start("magic-dust", NormalizedPosition::CENTER, None).unwrap();
        let b = engine.start("ice-shards", NormalizedPosition::CENTER, None).unwrap();
        let c = engine.start("fire-storm", NormalizedPosition::CENTER, None).unwrap();

        assert!(engine.cancel(b));
        assert!(!engine.cancel(b));
        assert!(!engine.is_running(b));
        assert!(engine.is_running(a));
        assert!(engine.is_running(c));

        assert_eq!(engine.cancel_all(), 2);
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.readout_all(), EngineReadout::default());
    }

    #[test]
    fn test_explicit_config_source() {
        let mut engine = engine();
        let config = ParticleSystemConfig {
            duration_ms: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            engine.start(config, NormalizedPosition::CENTER, None),
            Err(EffectError::InvalidConfig(_))
        ));

        let handle = engine
            .start(ParticleSystemConfig::default(), NormalizedPosition::CENTER, None)
            .unwrap();
        assert_eq!(engine.readout(handle).unwrap().live_particle_count, 50);
    }

    #[test]
    fn test_readout_all_sums_sessions() {
        let mut engine = engine();
        engine.start("orb-field", NormalizedPosition::CENTER, None).unwrap();
        engine.start("lightning-burst", NormalizedPosition::CENTER, None).unwrap();

        let total = engine.readout_all();
        assert_eq!(total.active_effects, 2);
        assert_eq!(total.live_particle_count, 24 + 40);
        assert_eq!(total.total_cap, 60 + 120);

        let mut buffer = InstanceBuffer::default();
        engine.write_instances(&mut buffer);
        assert_eq!(buffer.len(), 64);
    }
}
