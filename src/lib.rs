//! Botsite FX - Animated effects and arcade easter egg for the marketing site
//!
//! Core modules:
//! - `frame`: Cancellable run-every-frame loops
//! - `surface`: 2D draw surface abstraction (recording + Canvas2D)
//! - `transform`: CSS transform directives
//! - `particles`: Background particle field
//! - `scroll`: Scroll-velocity skew filter
//! - `parallax`: Parallax and pointer tilt
//! - `arcade`: Tile-grid arcade game (maze, player, ghosts)
//! - `settings`: Tunables, persisted separately in LocalStorage
//! - `web`: Browser host (wasm32 only)

pub mod arcade;
pub mod frame;
pub mod parallax;
pub mod particles;
pub mod scroll;
pub mod settings;
pub mod surface;
pub mod transform;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{QualityPreset, Settings};

/// Effect configuration constants
pub mod consts {
    /// Viewport area (px²) per background particle
    pub const PARTICLE_AREA_PER_PARTICLE: f32 = 9000.0;
    /// Hard cap on background particles at the default preset
    pub const PARTICLE_MAX_COUNT: usize = 150;
    /// Max absolute velocity component (px/frame)
    pub const PARTICLE_MAX_SPEED: f32 = 0.25;
    pub const PARTICLE_MIN_RADIUS: f32 = 0.5;
    pub const PARTICLE_MAX_RADIUS: f32 = 2.5;
    /// Squared distance below which two particles get a link line
    pub const PARTICLE_LINK_DISTANCE_SQ: f32 = 15000.0;

    /// Skew degrees per pixel of scroll velocity
    pub const SKEW_PER_PIXEL: f32 = 0.1;
    /// Absolute skew limit (degrees)
    pub const MAX_SKEW_DEG: f32 = 5.0;
    /// Fraction of the remaining distance covered each frame
    pub const SKEW_SMOOTHING: f32 = 0.1;
    /// Skews smaller than this snap to zero
    pub const SKEW_SNAP: f32 = 0.01;

    /// Extra margin (px) around the viewport where parallax stays active
    pub const PARALLAX_MARGIN: f32 = 100.0;
    /// Scale applied while a tilt card is hovered
    pub const TILT_HOVER_SCALE: f32 = 1.05;
    pub const TILT_DEFAULT_INTENSITY: f32 = 10.0;
}

/// Linear interpolation from `a` toward `b` by fraction `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
