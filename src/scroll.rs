//! Scroll-velocity skew filter
//!
//! Turns vertical scroll velocity into a smoothed vertical shear on the
//! content wrapper. Smoothing is a fixed per-frame lerp (not frame-rate
//! normalized), and the result is applied with no CSS transition.

use crate::consts::{SKEW_PER_PIXEL, SKEW_SNAP};
use crate::lerp;
use crate::settings::Settings;
use crate::transform::{StyleDirective, Transform, TransformOp};

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollFilter {
    last_offset: f32,
    current_skew: f32,
    smoothing: f32,
    max_skew: f32,
    enabled: bool,
}

impl ScrollFilter {
    /// Start from the current scroll offset so mounting mid-page causes no jolt
    pub fn new(initial_offset: f32, settings: &Settings) -> Self {
        Self {
            last_offset: initial_offset,
            current_skew: 0.0,
            smoothing: settings.skew_smoothing,
            max_skew: settings.max_skew_deg,
            enabled: !settings.reduced_motion,
        }
    }

    /// Advance one frame with the live scroll offset. Returns the new skew.
    pub fn tick(&mut self, offset: f32) -> f32 {
        let velocity = offset - self.last_offset;
        self.last_offset = offset;

        if !self.enabled {
            self.current_skew = 0.0;
            return 0.0;
        }

        let target = (velocity * SKEW_PER_PIXEL).clamp(-self.max_skew, self.max_skew);
        self.current_skew = lerp(self.current_skew, target, self.smoothing);
        if self.current_skew.abs() < SKEW_SNAP {
            self.current_skew = 0.0;
        }
        self.current_skew
    }

    pub fn skew(&self) -> f32 {
        self.current_skew
    }

    pub fn directive(&self) -> StyleDirective {
        let transform = if self.current_skew == 0.0 {
            Transform::identity()
        } else {
            Transform::identity().then(TransformOp::SkewY(self.current_skew))
        };
        StyleDirective::instant(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_tick_follows_smoothing() {
        let mut f = ScrollFilter::new(0.0, &Settings::default());
        // velocity 20 -> target 2.0 -> 10% of the way
        let skew = f.tick(20.0);
        assert!((skew - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_target_is_clamped() {
        let mut f = ScrollFilter::new(0.0, &Settings::default());
        let mut offset = 0.0;
        for _ in 0..200 {
            offset += 500.0;
            f.tick(offset);
        }
        assert!(f.skew() <= 5.0);
        assert!(f.skew() > 4.9);
    }

    #[test]
    fn test_snaps_to_zero_when_idle() {
        let mut f = ScrollFilter::new(0.0, &Settings::default());
        f.tick(-300.0);
        assert!(f.skew() < 0.0);
        let mut ticks = 0;
        while f.skew() != 0.0 {
            f.tick(-300.0);
            ticks += 1;
            assert!(ticks < 200, "skew never settled");
        }
        assert_eq!(f.directive().transform_css(), "none");
    }

    #[test]
    fn test_directive_is_instant_skew() {
        let mut f = ScrollFilter::new(100.0, &Settings::default());
        f.tick(150.0);
        let d = f.directive();
        assert_eq!(d.transition, None);
        assert!(d.transform_css().starts_with("skewY("));
    }

    #[test]
    fn test_reduced_motion_keeps_identity() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut f = ScrollFilter::new(0.0, &settings);
        assert_eq!(f.tick(900.0), 0.0);
        assert!(f.directive().transform.is_identity());
    }

    proptest! {
        #[test]
        fn test_skew_bounded_and_converges(offsets in prop::collection::vec(-5000.0f32..5000.0, 1..100)) {
            let mut f = ScrollFilter::new(0.0, &Settings::default());
            for &o in &offsets {
                let s = f.tick(o);
                prop_assert!(s.abs() <= 5.0);
            }
            let resting = *offsets.last().unwrap();
            for _ in 0..100 {
                f.tick(resting);
            }
            prop_assert!(f.skew().abs() < 0.01);
        }
    }
}
