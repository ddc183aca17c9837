//! Parallax and pointer tilt
//!
//! Both effects are stateless per event: each scroll or pointer move
//! recomputes the transform from the element's current geometry.
//! Parallax is applied instantly so it stays locked to scroll; tilt uses a
//! short eased transition.

use glam::Vec2;

use crate::consts::TILT_HOVER_SCALE;
use crate::settings::Settings;
use crate::transform::{StyleDirective, TILT_TRANSITION, Transform, TransformOp};

/// Perspective used by tilt cards
const TILT_PERSPECTIVE: f32 = 1000.0;

/// Element bounds relative to the viewport (as reported by the layout engine)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Scroll-driven parallax for one element
#[derive(Debug, Clone, PartialEq)]
pub struct Parallax {
    /// Translation per pixel of distance from the viewport center
    pub speed: f32,
    /// Degrees of X rotation at one full viewport height of distance
    pub rotation_factor: f32,
    margin: f32,
    enabled: bool,
}

/// Last transform computed for a parallax element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParallaxState {
    pub translate_y: f32,
    pub rotate_x: f32,
}

impl Parallax {
    pub fn new(speed: f32, rotation_factor: f32, settings: &Settings) -> Self {
        Self {
            speed,
            rotation_factor,
            margin: settings.parallax_margin,
            enabled: !settings.reduced_motion,
        }
    }

    /// Whether the element intersects the viewport grown by the margin
    pub fn in_range(&self, rect: &ElementRect, viewport: Viewport) -> bool {
        rect.bottom() >= -self.margin && rect.top <= viewport.height + self.margin
    }

    /// Compute the transform for the element's current geometry
    pub fn compute(&self, rect: &ElementRect, viewport: Viewport) -> ParallaxState {
        let distance = rect.center().y - viewport.height * 0.5;
        let rotate_x = if viewport.height > 0.0 {
            distance / viewport.height * self.rotation_factor
        } else {
            0.0
        };
        ParallaxState {
            translate_y: -distance * self.speed,
            rotate_x,
        }
    }

    /// Scroll handler. `None` when the element is off screen and should be
    /// left untouched.
    pub fn on_scroll(&self, rect: &ElementRect, viewport: Viewport) -> Option<StyleDirective> {
        if !self.enabled || !self.in_range(rect, viewport) {
            return None;
        }
        let state = self.compute(rect, viewport);
        Some(StyleDirective::instant(
            Transform::identity()
                .then(TransformOp::TranslateY(state.translate_y))
                .then(TransformOp::RotateX(state.rotate_x)),
        ))
    }
}

/// Pointer-driven 3D tilt for one element
#[derive(Debug, Clone, PartialEq)]
pub struct Tilt {
    /// Degrees of rotation with the pointer at the element edge
    pub intensity: f32,
    state: TiltState,
    enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltState {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale: f32,
}

impl Default for TiltState {
    fn default() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Tilt {
    pub fn new(intensity: f32, settings: &Settings) -> Self {
        Self {
            intensity,
            state: TiltState::default(),
            enabled: !settings.reduced_motion,
        }
    }

    pub fn state(&self) -> TiltState {
        self.state
    }

    /// Pointer moved to `pointer` (viewport coordinates) over `rect`
    pub fn on_pointer_move(&mut self, rect: &ElementRect, pointer: Vec2) -> StyleDirective {
        if !self.enabled {
            return StyleDirective::instant(Transform::identity());
        }
        let half = Vec2::new(rect.width, rect.height) * 0.5;
        let offset = pointer - rect.center();
        let norm = Vec2::new(
            if half.x > 0.0 { offset.x / half.x } else { 0.0 },
            if half.y > 0.0 { offset.y / half.y } else { 0.0 },
        )
        .clamp(Vec2::NEG_ONE, Vec2::ONE);

        self.state = TiltState {
            rotate_x: -norm.y * self.intensity,
            rotate_y: norm.x * self.intensity,
            scale: TILT_HOVER_SCALE,
        };
        self.directive()
    }

    pub fn on_pointer_leave(&mut self) -> StyleDirective {
        self.state = TiltState::default();
        if !self.enabled {
            return StyleDirective::instant(Transform::identity());
        }
        self.directive()
    }

    fn directive(&self) -> StyleDirective {
        StyleDirective::eased(
            Transform::identity()
                .then(TransformOp::Perspective(TILT_PERSPECTIVE))
                .then(TransformOp::RotateX(self.state.rotate_x))
                .then(TransformOp::RotateY(self.state.rotate_y))
                .then(TransformOp::Scale(self.state.scale)),
            TILT_TRANSITION,
        )
    }
}
