//! Command-recording back-end.
//!
//! Records every surface call as a [`DrawCommand`]. Hosts that render on
//! another thread or in another runtime replay the list; tests inspect it.

use crate::color::Color;
use crate::surface::{DrawSurface, Paint};

/// A recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear a rectangle.
    ClearRect {
        /// Left.
        x: f32,
        /// Top.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
    },
    /// Fill a rectangle.
    FillRect {
        /// Left.
        x: f32,
        /// Top.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
    },
    /// Start a path.
    BeginPath,
    /// Move the pen.
    MoveTo {
        /// X.
        x: f32,
        /// Y.
        y: f32,
    },
    /// Straight segment.
    LineTo {
        /// X.
        x: f32,
        /// Y.
        y: f32,
    },
    /// Circular arc.
    Arc {
        /// Center x.
        x: f32,
        /// Center y.
        y: f32,
        /// Radius.
        radius: f32,
        /// Start angle (radians).
        start_angle: f32,
        /// End angle (radians).
        end_angle: f32,
    },
    /// Close the sub-path.
    ClosePath,
    /// Fill the path.
    Fill,
    /// Stroke the path.
    Stroke,
    /// Push state.
    Save,
    /// Pop state.
    Restore,
    /// Translate.
    Translate {
        /// X offset.
        x: f32,
        /// Y offset.
        y: f32,
    },
    /// Rotate (radians).
    Rotate(f32),
    /// Global alpha.
    GlobalAlpha(f32),
    /// Fill style.
    FillStyle(Paint),
    /// Stroke color.
    StrokeColor(Color),
    /// Stroke width.
    LineWidth(f32),
    /// Blur/glow.
    Shadow {
        /// Blur radius.
        blur: f32,
        /// Glow color.
        color: Color,
    },
}

/// Surface that records calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    width: f32,
    height: f32,
    /// All commands from the frame.
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    /// Creates a recorder that reports the given pixel size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::with_capacity(4096),
        }
    }

    /// Changes the reported size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Begins a new frame, dropping previously recorded commands.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
    }

    /// Returns the recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Returns the total command count.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Counts commands matching a predicate.
    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl DrawSurface for CommandRecorder {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawCommand::ClearRect { x, y, width, height });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawCommand::FillRect { x, y, width, height });
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::LineTo { x, y });
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn close_path(&mut self) {
        self.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, angle: f32) {
        self.push(DrawCommand::Rotate(angle));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_fill(&mut self, paint: Paint) {
        self.push(DrawCommand::FillStyle(paint));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.push(DrawCommand::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.push(DrawCommand::LineWidth(width));
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.push(DrawCommand::Shadow { blur, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_frame() {
        let mut recorder = CommandRecorder::new(800.0, 600.0);

        recorder.begin_frame();
        recorder.set_fill(Paint::Solid(Color::WHITE));
        recorder.fill_rect(0.0, 0.0, 100.0, 50.0);

        assert_eq!(recorder.command_count(), 2);
        assert_eq!(
            recorder.count_where(|c| matches!(c, DrawCommand::FillRect { .. })),
            1
        );

        recorder.begin_frame();
        assert_eq!(recorder.command_count(), 0);
    }

    #[test]
    fn test_zero_size_recorder_is_not_ready() {
        let mut recorder = CommandRecorder::default();
        assert!(!recorder.is_ready());

        recorder.resize(320.0, 240.0);
        assert!(recorder.is_ready());
    }

    #[test]
    fn test_take_commands_empties_recorder() {
        let mut recorder = CommandRecorder::new(10.0, 10.0);
        recorder.save();
        recorder.restore();

        let taken = recorder.take_commands();
        assert_eq!(taken, vec![DrawCommand::Save, DrawCommand::Restore]);
        assert_eq!(recorder.command_count(), 0);
    }
}
