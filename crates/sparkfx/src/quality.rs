//! # Adaptive Quality
//!
//! Watches frame times and trades particle count for frame rate. FPS is
//! smoothed over a short window; below the low threshold the cap shrinks
//! geometrically, above the high threshold it grows back toward the
//! configured maximum.
//!
//! ```text
//! fps < low_fps   : cap = max(floor, cap * decrease_factor)
//! fps > high_fps  : cap = min(max,   cap * increase_factor)
//! otherwise       : unchanged
//! ```
//!
//! A quality scalar follows the same rule and gates expensive effects.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Controller thresholds and factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityTuning {
    /// Below this smoothed FPS the cap shrinks.
    pub low_fps: f32,
    /// Above this smoothed FPS the cap grows.
    pub high_fps: f32,
    /// Multiplier applied when shrinking.
    pub decrease_factor: f32,
    /// Multiplier applied when growing.
    pub increase_factor: f32,
    /// Lowest cap the controller will set.
    pub floor_particles: usize,
    /// Lowest quality scalar.
    pub min_quality: f32,
    /// Highest quality scalar.
    pub max_quality: f32,
    /// Frame samples averaged for the smoothed FPS.
    pub fps_window: usize,
}

impl Default for QualityTuning {
    fn default() -> Self {
        Self {
            low_fps: 30.0,
            high_fps: 55.0,
            decrease_factor: 0.8,
            increase_factor: 1.1,
            floor_particles: 10,
            min_quality: 0.5,
            max_quality: 1.0,
            fps_window: 10,
        }
    }
}

/// Frame-rate driven particle cap controller.
///
/// Owns a fixed ring of FPS samples; ticking never allocates.
#[derive(Debug, Clone)]
pub struct AdaptiveQualityController {
    tuning: QualityTuning,
    samples: Box<[f32]>,
    next_sample: usize,
    filled: usize,
    smoothed_fps: f32,
    max_particles: usize,
    floor: usize,
    quality: f32,
}

impl AdaptiveQualityController {
    /// Creates a controller for an effect allowed `max_particles`.
    ///
    /// The floor is `min(floor_particles, max_particles)` and never below
    /// one, so a tiny maximum is honored instead of overridden.
    #[must_use]
    pub fn new(tuning: QualityTuning, max_particles: usize, initial_quality: f32) -> Self {
        let tuning = sanitize(tuning);
        let floor = tuning.floor_particles.min(max_particles).max(1);
        let initial_quality = if initial_quality.is_finite() {
            initial_quality
        } else {
            tuning.max_quality
        };
        Self {
            samples: vec![0.0; tuning.fps_window].into_boxed_slice(),
            next_sample: 0,
            filled: 0,
            smoothed_fps: 0.0,
            max_particles,
            floor,
            quality: initial_quality.clamp(tuning.min_quality, tuning.max_quality),
            tuning,
        }
    }

    /// Records a frame time without adjusting anything.
    ///
    /// Non-positive and non-finite frame times are ignored.
    pub fn observe(&mut self, frame_time_ms: f32) {
        if !(frame_time_ms.is_finite() && frame_time_ms > 0.0) {
            return;
        }
        self.samples[self.next_sample] = 1000.0 / frame_time_ms;
        self.next_sample = (self.next_sample + 1) % self.samples.len();
        self.filled = (self.filled + 1).min(self.samples.len());

        let sum: f32 = self.samples[..self.filled].iter().sum();
        self.smoothed_fps = sum / self.filled as f32;
    }

    /// Records a frame time and returns the adjusted cap.
    ///
    /// The result always lies in `[floor, max_particles]` (or is zero when
    /// the maximum is zero).
    pub fn tick(&mut self, frame_time_ms: f32, current_cap: usize) -> usize {
        self.observe(frame_time_ms);

        if self.max_particles == 0 {
            return 0;
        }
        let cap = current_cap.clamp(self.floor, self.max_particles);
        if self.filled == 0 {
            return cap;
        }

        let fps = self.smoothed_fps;
        let next = if fps < self.tuning.low_fps {
            self.quality = (self.quality * self.tuning.decrease_factor).max(self.tuning.min_quality);
            ((cap as f32 * self.tuning.decrease_factor).floor() as usize).max(self.floor)
        } else if fps > self.tuning.high_fps {
            self.quality = (self.quality * self.tuning.increase_factor).min(self.tuning.max_quality);
            if cap < self.max_particles {
                ((cap as f32 * self.tuning.increase_factor).ceil() as usize).min(self.max_particles)
            } else {
                cap
            }
        } else {
            cap
        };

        if next != cap {
            debug!(fps, from = cap, to = next, "particle cap adjusted");
        }
        next
    }

    /// Smoothed FPS over the sample window (0 before the first sample).
    #[must_use]
    pub const fn smoothed_fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Current quality scalar.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    /// Lowest cap this controller sets.
    #[must_use]
    pub const fn floor(&self) -> usize {
        self.floor
    }

    /// Configured maximum.
    #[must_use]
    pub const fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Returns the tuning.
    #[must_use]
    pub const fn tuning(&self) -> &QualityTuning {
        &self.tuning
    }
}

/// Pins factors and bounds to values that keep the controller convergent.
fn sanitize(mut tuning: QualityTuning) -> QualityTuning {
    let defaults = QualityTuning::default();
    if !(tuning.decrease_factor > 0.0 && tuning.decrease_factor < 1.0) {
        tuning.decrease_factor = defaults.decrease_factor;
    }
    if !(tuning.increase_factor.is_finite() && tuning.increase_factor > 1.0) {
        tuning.increase_factor = defaults.increase_factor;
    }
    if !(tuning.min_quality.is_finite() && tuning.max_quality.is_finite())
        || tuning.min_quality > tuning.max_quality
    {
        tuning.min_quality = defaults.min_quality;
        tuning.max_quality = defaults.max_quality;
    }
    tuning.fps_window = tuning.fps_window.max(1);
    tuning
}
