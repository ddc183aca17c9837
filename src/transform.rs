//! CSS-like transform directives
//!
//! Effects never touch the DOM directly; they produce a [`StyleDirective`]
//! that the host writes into an element's `transform`/`transition` style.

use std::fmt;

/// A single transform function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Perspective distance in pixels (must come first to take effect)
    Perspective(f32),
    /// Vertical translation in pixels
    TranslateY(f32),
    /// Rotation about the X axis (degrees)
    RotateX(f32),
    /// Rotation about the Y axis (degrees)
    RotateY(f32),
    /// Vertical-axis shear (degrees)
    SkewY(f32),
    Scale(f32),
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TransformOp::Perspective(px) => write!(f, "perspective({:.0}px)", px),
            TransformOp::TranslateY(px) => write!(f, "translateY({:.2}px)", px),
            TransformOp::RotateX(deg) => write!(f, "rotateX({:.2}deg)", deg),
            TransformOp::RotateY(deg) => write!(f, "rotateY({:.2}deg)", deg),
            TransformOp::SkewY(deg) => write!(f, "skewY({:.3}deg)", deg),
            TransformOp::Scale(s) => write!(f, "scale3d({s:.3}, {s:.3}, {s:.3})"),
        }
    }
}

/// Ordered composition of transform functions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transform {
    pub ops: Vec<TransformOp>,
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn then(mut self, op: TransformOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// Transition used by pointer tilt so the card feels tactile
pub const TILT_TRANSITION: &str = "transform 0.1s ease-out";

/// What the host applies to an element's style
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDirective {
    pub transform: Transform,
    /// CSS `transition` value; `None` means apply instantly (`transition: none`)
    pub transition: Option<&'static str>,
}

impl StyleDirective {
    /// Apply without easing (scroll-locked effects)
    pub fn instant(transform: Transform) -> Self {
        Self {
            transform,
            transition: None,
        }
    }

    pub fn eased(transform: Transform, transition: &'static str) -> Self {
        Self {
            transform,
            transition: Some(transition),
        }
    }

    pub fn transform_css(&self) -> String {
        self.transform.to_string()
    }

    pub fn transition_css(&self) -> &'static str {
        self.transition.unwrap_or("none")
    }
}
