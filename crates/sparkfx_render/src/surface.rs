//! The draw surface contract.
//!
//! This is the full capability set the engine needs from a 2D back-end:
//! clear, rectangles, arcs, paths, fill/stroke, state save/restore,
//! transforms, alpha, colors, line width and an optional blur.

use crate::color::Color;

/// Two-stop radial gradient, centered on a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Radius where `inner` is fully applied.
    pub inner_radius: f32,
    /// Radius where `outer` is fully applied.
    pub outer_radius: f32,
    /// Color at the center.
    pub inner: Color,
    /// Color at the rim.
    pub outer: Color,
}

/// Fill style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Flat color.
    Solid(Color),
    /// Radial gradient.
    Radial(RadialGradient),
}

/// A 2D drawing surface.
///
/// Calls mirror the browser canvas API. Implementations must never panic;
/// a back-end that cannot honor a call ignores it.
pub trait DrawSurface {
    /// Surface width in pixels.
    fn width(&self) -> f32;

    /// Surface height in pixels.
    fn height(&self) -> f32;

    /// Returns true if the surface can be drawn on.
    ///
    /// Zero-sized surfaces are treated as absent.
    fn is_ready(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Clears a rectangle to transparent.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fills a rectangle with the current fill.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Starts a new path.
    fn begin_path(&mut self);

    /// Moves the pen without drawing.
    fn move_to(&mut self, x: f32, y: f32);

    /// Adds a straight segment.
    fn line_to(&mut self, x: f32, y: f32);

    /// Adds a circular arc (angles in radians).
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);

    /// Closes the current sub-path.
    fn close_path(&mut self);

    /// Fills the current path.
    fn fill(&mut self);

    /// Strokes the current path.
    fn stroke(&mut self);

    /// Pushes the drawing state.
    fn save(&mut self);

    /// Pops the drawing state.
    fn restore(&mut self);

    /// Translates the coordinate system.
    fn translate(&mut self, x: f32, y: f32);

    /// Rotates the coordinate system (radians).
    fn rotate(&mut self, angle: f32);

    /// Sets the global alpha multiplier.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Sets the fill style.
    fn set_fill(&mut self, paint: Paint);

    /// Sets the stroke color.
    fn set_stroke_color(&mut self, color: Color);

    /// Sets the stroke width.
    fn set_line_width(&mut self, width: f32);

    /// Sets a blur/glow. A blur of zero disables it.
    ///
    /// Optional capability: the default ignores the call.
    fn set_shadow(&mut self, _blur: f32, _color: Color) {}
}
