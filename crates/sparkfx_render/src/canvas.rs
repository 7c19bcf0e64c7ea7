//! Browser canvas back-end.
//!
//! Wraps a `CanvasRenderingContext2d`. Every fallible canvas call is
//! best-effort: a rejected call is dropped, never surfaced.

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::color::Color;
use crate::surface::{DrawSurface, Paint};

/// [`DrawSurface`] over a browser 2D canvas context.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    canvas: Option<HtmlCanvasElement>,
}

impl CanvasSurface {
    /// Wraps a 2D context.
    ///
    /// A context detached from its canvas reports a zero size, which makes
    /// the engine skip drawing.
    #[must_use]
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        let canvas = context.canvas();
        Self { context, canvas }
    }

    /// Returns the wrapped context.
    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }
}

impl DrawSurface for CanvasSurface {
    fn width(&self) -> f32 {
        self.canvas.as_ref().map_or(0.0, |c| c.width() as f32)
    }

    fn height(&self) -> f32 {
        self.canvas.as_ref().map_or(0.0, |c| c.height() as f32)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.context
            .clear_rect(f64::from(x), f64::from(y), f64::from(width), f64::from(height));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.context
            .fill_rect(f64::from(x), f64::from(y), f64::from(width), f64::from(height));
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.context.move_to(f64::from(x), f64::from(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.context.line_to(f64::from(x), f64::from(y));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        // Negative radii throw in the browser
        let _ = self.context.arc(
            f64::from(x),
            f64::from(y),
            f64::from(radius.max(0.0)),
            f64::from(start_angle),
            f64::from(end_angle),
        );
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.context.translate(f64::from(x), f64::from(y));
    }

    fn rotate(&mut self, angle: f32) {
        let _ = self.context.rotate(f64::from(angle));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.context.set_global_alpha(f64::from(alpha.clamp(0.0, 1.0)));
    }

    fn set_fill(&mut self, paint: Paint) {
        match paint {
            Paint::Solid(color) => self.context.set_fill_style_str(&color.to_css()),
            Paint::Radial(gradient) => {
                let created = self.context.create_radial_gradient(
                    f64::from(gradient.x),
                    f64::from(gradient.y),
                    f64::from(gradient.inner_radius.max(0.0)),
                    f64::from(gradient.x),
                    f64::from(gradient.y),
                    f64::from(gradient.outer_radius.max(0.0)),
                );
                match created {
                    Ok(canvas_gradient) => {
                        let _ = canvas_gradient.add_color_stop(0.0, &gradient.inner.to_css());
                        let _ = canvas_gradient.add_color_stop(1.0, &gradient.outer.to_css());
                        self.context.set_fill_style_canvas_gradient(&canvas_gradient);
                    }
                    Err(_) => self.context.set_fill_style_str(&gradient.inner.to_css()),
                }
            }
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.context.set_stroke_style_str(&color.to_css());
    }

    fn set_line_width(&mut self, width: f32) {
        self.context.set_line_width(f64::from(width));
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.context.set_shadow_blur(f64::from(blur.max(0.0)));
        self.context.set_shadow_color(&color.to_css());
    }
}
