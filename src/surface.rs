//! 2D draw surface abstraction
//!
//! Simulators render in immediate mode through [`Surface`]. The browser host
//! backs it with a Canvas2D context; tests and the native demo use
//! [`DrawList`], which records every call as a [`DrawCommand`].

use glam::Vec2;

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Colors for effect and game elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.02, 0.02, 0.05, 1.0];
    pub const VIGNETTE_CENTER: Color = [0.04, 0.05, 0.12, 1.0];
    pub const VIGNETTE_EDGE: Color = [0.0, 0.0, 0.0, 1.0];
    pub const PARTICLE: Color = [0.55, 0.75, 1.0, 0.8];
    pub const PARTICLE_LINK: Color = [0.55, 0.75, 1.0, 0.08];

    pub const MAZE_WALL: Color = [0.13, 0.2, 0.85, 1.0];
    pub const PELLET: Color = [1.0, 0.85, 0.7, 1.0];
    pub const PLAYER: Color = [1.0, 0.9, 0.1, 1.0];
    pub const GHOST_DIRECT: Color = [1.0, 0.1, 0.1, 1.0];
    pub const GHOST_AMBUSH: Color = [1.0, 0.7, 0.85, 1.0];
    pub const GHOST_FLANK: Color = [0.1, 0.9, 1.0, 1.0];
    pub const GHOST_ERRATIC: Color = [1.0, 0.6, 0.2, 1.0];
    pub const GHOST_SCARED: Color = [0.15, 0.2, 0.9, 1.0];
    pub const GHOST_SCARED_BLINK: Color = [0.9, 0.9, 1.0, 1.0];
}

/// Format a color as a CSS `rgba()` string
pub fn css_color(c: Color) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        c[3].clamp(0.0, 1.0)
    )
}

/// Immediate-mode drawing target
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> Vec2;

    /// Called once before each frame is drawn
    fn begin_frame(&mut self) {}

    /// Clear the whole surface to a solid color
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);

    /// Fill the whole surface with a radial gradient centered at `center`
    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Fill a pie slice from `start` to `end` (radians, clockwise in screen space)
    fn fill_wedge(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    RadialGradient {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Wedge {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
}

/// Surface that records draw calls instead of rasterizing them
#[derive(Debug, Clone)]
pub struct DrawList {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Drop recorded commands (call between frames)
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn count_lines(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn count_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }
}

impl Surface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect {
            origin,
            size,
            color,
        });
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        self.commands.push(DrawCommand::RadialGradient {
            center,
            radius,
            inner,
            outer,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_wedge(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        self.commands.push(DrawCommand::Wedge {
            center,
            radius,
            start,
            end,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color_formats_rgba() {
        assert_eq!(css_color([1.0, 0.0, 0.5, 0.25]), "rgba(255, 0, 128, 0.250)");
    }

    #[test]
    fn test_draw_list_records_in_order() {
        let mut list = DrawList::new(100.0, 50.0);
        list.clear(colors::BACKGROUND);
        list.fill_circle(Vec2::new(1.0, 2.0), 3.0, colors::PARTICLE);
        list.stroke_line(Vec2::ZERO, Vec2::ONE, 1.0, colors::PARTICLE_LINK);

        assert_eq!(list.size(), Vec2::new(100.0, 50.0));
        assert_eq!(list.commands.len(), 3);
        assert_eq!(list.commands[0], DrawCommand::Clear(colors::BACKGROUND));
        assert_eq!(list.count_circles(), 1);
        assert_eq!(list.count_lines(), 1);

        list.reset();
        assert!(list.commands.is_empty());
    }
}
