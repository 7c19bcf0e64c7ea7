//! # Type Renderer
//!
//! Draws one particle according to its visual type. Every particle is
//! drawn inside a `save`/`restore` pair, so nothing leaks between
//! particles:
//!
//! ```text
//! save
//!   global alpha = opacity * intensity
//!   shadow blur  (glow, quality permitting)
//!   trail stroke (trail, quality permitting)
//!   translate to particle, rotate (rotate flag)
//!   shape
//! restore
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};
use sparkfx_render::{Color, DrawSurface, Paint, ParticleInstance, RadialGradient};

use crate::particle::{Particle, VisualType};

/// Renderer constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTuning {
    /// Pulse angular frequency (rad/ms).
    pub pulse_frequency: f32,
    /// Pulse radius swing as a fraction of the radius.
    pub pulse_amplitude: f32,
    /// Glow blur as a multiple of the radius.
    pub glow_blur_scale: f32,
    /// Quality needed to draw glow.
    pub glow_min_quality: f32,
    /// Quality needed to draw trails.
    pub trail_min_quality: f32,
    /// Trail length expressed as milliseconds of travel.
    pub trail_length_ms: f32,
    /// Orbit speed of magic satellites (rad/ms).
    pub satellite_speed: f32,
    /// Flame flicker frequency (rad/ms).
    pub flicker_frequency: f32,
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            pulse_frequency: 0.008,
            pulse_amplitude: 0.3,
            glow_blur_scale: 2.0,
            glow_min_quality: 0.75,
            trail_min_quality: 0.6,
            trail_length_ms: 40.0,
            satellite_speed: 0.004,
            flicker_frequency: 0.02,
        }
    }
}

const STAR_POINTS: u32 = 5;
const STAR_INNER_RATIO: f32 = 0.45;
const MAGIC_SATELLITES: u32 = 3;
const ENERGY_RINGS: u32 = 2;

/// Draws particles by visual type.
#[derive(Debug, Clone, Default)]
pub struct TypeRenderer {
    tuning: RenderTuning,
}

impl TypeRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(tuning: RenderTuning) -> Self {
        Self { tuning }
    }

    /// Returns the tuning.
    #[must_use]
    pub const fn tuning(&self) -> &RenderTuning {
        &self.tuning
    }

    /// Returns true if glow is drawn at this quality.
    #[must_use]
    pub fn glow_enabled(&self, quality: f32) -> bool {
        quality >= self.tuning.glow_min_quality
    }

    /// Returns true if trails are drawn at this quality.
    #[must_use]
    pub fn trail_enabled(&self, quality: f32) -> bool {
        quality >= self.tuning.trail_min_quality
    }

    /// Final draw radius: size, times scale (scale flag), times pulse (pulse flag).
    #[must_use]
    pub fn radius(&self, particle: &Particle, time_ms: f32) -> f32 {
        let mut radius = particle.size;
        if particle.flags.scale {
            radius *= particle.scale;
        }
        if particle.flags.pulse {
            let phase = time_ms * self.tuning.pulse_frequency + particle.id.0 as f32;
            radius *= 1.0 + self.tuning.pulse_amplitude * phase.sin();
        }
        radius.max(0.0)
    }

    /// Draws one particle.
    ///
    /// Invisible particles (zero alpha or radius) issue no calls.
    pub fn draw(&self, surface: &mut dyn DrawSurface, particle: &Particle, time_ms: f32, quality: f32) {
        let alpha = particle.alpha();
        let radius = self.radius(particle, time_ms);
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        let color = particle.color;
        let position = particle.position;

        surface.save();
        surface.set_global_alpha(alpha);

        if particle.flags.glow && self.glow_enabled(quality) {
            surface.set_shadow(radius * self.tuning.glow_blur_scale, color);
        }

        if particle.flags.trail && self.trail_enabled(quality) {
            let tail = position - particle.velocity * self.tuning.trail_length_ms;
            surface.set_stroke_color(color);
            surface.set_line_width((radius * 0.5).max(1.0));
            surface.begin_path();
            surface.move_to(tail.x, tail.y);
            surface.line_to(position.x, position.y);
            surface.stroke();
        }

        surface.translate(position.x, position.y);
        if particle.flags.rotate {
            surface.rotate(particle.rotation);
        }

        match particle.visual_type {
            VisualType::Sparkle => draw_star(surface, radius, color),
            VisualType::Fire => self.draw_flame(surface, particle, radius, time_ms),
            VisualType::Lightning => draw_bolt(surface, radius, color),
            VisualType::Ice => draw_shard(surface, radius, color),
            VisualType::Magic => self.draw_magic(surface, particle, radius, time_ms),
            VisualType::Energy => draw_energy(surface, radius, color),
            VisualType::Orb => draw_orb(surface, radius, color),
            VisualType::Dust => draw_disc(surface, radius, color),
        }

        surface.restore();
    }

    /// Builds the GPU instance for a particle.
    #[must_use]
    pub fn instance(&self, particle: &Particle, time_ms: f32) -> ParticleInstance {
        let mut color = particle.color.to_array();
        color[3] *= particle.alpha();
        ParticleInstance {
            position: particle.position.to_array(),
            radius: self.radius(particle, time_ms),
            rotation: if particle.flags.rotate {
                particle.rotation
            } else {
                0.0
            },
            color,
            shape: particle.visual_type.shape_index(),
            flags: particle.flags.bits(),
            _padding: [0; 2],
        }
    }

    fn draw_flame(&self, surface: &mut dyn DrawSurface, particle: &Particle, radius: f32, time_ms: f32) {
        let color = particle.color;
        surface.set_fill(Paint::Radial(RadialGradient {
            x: 0.0,
            y: 0.0,
            inner_radius: 0.0,
            outer_radius: radius,
            inner: color.lerp(Color::WHITE, 0.5),
            outer: color.with_alpha(0.0),
        }));
        surface.begin_path();
        surface.arc(0.0, 0.0, radius, 0.0, TAU);
        surface.fill();

        // Flame tongue
        let phase = time_ms * self.tuning.flicker_frequency + particle.id.0 as f32;
        let tip = radius * (1.6 + 0.2 * phase.sin());
        surface.set_fill(Paint::Solid(color));
        surface.begin_path();
        surface.move_to(-radius * 0.5, 0.0);
        surface.line_to(-radius * 0.35, -radius * 0.9);
        surface.line_to(0.0, -tip);
        surface.line_to(radius * 0.35, -radius * 0.9);
        surface.line_to(radius * 0.5, 0.0);
        surface.close_path();
        surface.fill();
    }

    fn draw_magic(&self, surface: &mut dyn DrawSurface, particle: &Particle, radius: f32, time_ms: f32) {
        draw_disc(surface, radius, particle.color);

        let base = time_ms * self.tuning.satellite_speed + particle.id.0 as f32;
        let orbit = radius * 1.8;
        for k in 0..MAGIC_SATELLITES {
            let angle = base + TAU * k as f32 / MAGIC_SATELLITES as f32;
            surface.begin_path();
            surface.arc(angle.cos() * orbit, angle.sin() * orbit, radius * 0.3, 0.0, TAU);
            surface.fill();
        }
    }
}

fn draw_disc(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    surface.set_fill(Paint::Solid(color));
    surface.begin_path();
    surface.arc(0.0, 0.0, radius, 0.0, TAU);
    surface.fill();
}

fn draw_star(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    let inner = radius * STAR_INNER_RATIO;
    surface.set_fill(Paint::Solid(color));
    surface.begin_path();
    for k in 0..STAR_POINTS * 2 {
        let angle = -FRAC_PI_2 + k as f32 * PI / STAR_POINTS as f32;
        let r = if k % 2 == 0 { radius } else { inner };
        let (x, y) = (angle.cos() * r, angle.sin() * r);
        if k == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
    surface.close_path();
    surface.fill();
}

fn draw_bolt(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    surface.set_stroke_color(color);
    surface.set_line_width((radius * 0.3).max(1.0));
    surface.begin_path();
    surface.move_to(-radius, -radius);
    surface.line_to(radius, radius);
    surface.move_to(radius, -radius);
    surface.line_to(-radius, radius);
    surface.stroke();
}

fn draw_shard(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    // Equilateral triangle inscribed in the radius
    let half_width = radius * 0.866;
    surface.set_fill(Paint::Solid(color));
    surface.begin_path();
    surface.move_to(0.0, -radius);
    surface.line_to(half_width, radius * 0.5);
    surface.line_to(-half_width, radius * 0.5);
    surface.close_path();
    surface.fill();
}

fn draw_energy(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    draw_disc(surface, radius, color);

    surface.set_stroke_color(color);
    surface.set_line_width((radius * 0.15).max(1.0));
    for k in 1..=ENERGY_RINGS {
        surface.begin_path();
        surface.arc(0.0, 0.0, radius * (1.0 + 0.6 * k as f32), 0.0, TAU);
        surface.stroke();
    }
}

fn draw_orb(surface: &mut dyn DrawSurface, radius: f32, color: Color) {
    surface.set_fill(Paint::Radial(RadialGradient {
        x: 0.0,
        y: 0.0,
        inner_radius: radius * 0.1,
        outer_radius: radius,
        inner: color.lerp(Color::WHITE, 0.6),
        outer: color.with_alpha(0.0),
    }));
    surface.begin_path();
    surface.arc(0.0, 0.0, radius, 0.0, TAU);
    surface.fill();
}
