//! Background particle field
//!
//! Free-floating point masses bouncing inside the viewport, linked by faint
//! lines when close. Purely decorative: no failure modes beyond a missing
//! surface, in which case a frame does nothing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::settings::Settings;
use crate::surface::{Surface, colors};

/// A single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Particle {
    /// Advance one frame, reflecting off the `[0, bounds]` box
    pub fn step(&mut self, bounds: Vec2) {
        self.pos += self.vel;

        if self.pos.x < 0.0 || self.pos.x > bounds.x {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.clamp(0.0, bounds.x);
        }
        if self.pos.y < 0.0 || self.pos.y > bounds.y {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.clamp(0.0, bounds.y);
        }
    }
}

/// Number of particles for a viewport, capped at `cap`
pub fn particle_count(width: f32, height: f32, cap: usize) -> usize {
    let by_area = (width.max(0.0) * height.max(0.0) / PARTICLE_AREA_PER_PARTICLE) as usize;
    by_area.min(cap)
}

/// The particle field simulator
#[derive(Debug, Clone)]
pub struct ParticleField {
    bounds: Vec2,
    particles: Vec<Particle>,
    cap: usize,
    link_distance_sq: f32,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(width: f32, height: f32, settings: &Settings, seed: u64) -> Self {
        let mut field = Self {
            bounds: Vec2::ZERO,
            particles: Vec::new(),
            cap: settings.max_particles(),
            link_distance_sq: settings.effective_link_distance_sq(),
            rng: Pcg32::seed_from_u64(seed),
        };
        field.initialize(width, height);
        field
    }

    /// Populate a fresh batch of particles for the given viewport
    pub fn initialize(&mut self, width: f32, height: f32) {
        let count = particle_count(width, height, self.cap);
        let rng = &mut self.rng;

        // Build the whole batch before swapping it in so no frame ever sees
        // a half-populated field.
        let batch: Vec<Particle> = (0..count)
            .map(|_| Particle {
                pos: Vec2::new(
                    rng.random_range(0.0..=width),
                    rng.random_range(0.0..=height),
                ),
                vel: Vec2::new(
                    rng.random_range(-PARTICLE_MAX_SPEED..=PARTICLE_MAX_SPEED),
                    rng.random_range(-PARTICLE_MAX_SPEED..=PARTICLE_MAX_SPEED),
                ),
                radius: rng.random_range(PARTICLE_MIN_RADIUS..=PARTICLE_MAX_RADIUS),
            })
            .collect();

        self.bounds = Vec2::new(width, height);
        self.particles = batch;
    }

    /// Discard all particles and regenerate for the new viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("Particle field resized to {}x{}", width, height);
        self.initialize(width, height);
    }

    pub fn tick(&mut self) {
        let bounds = self.bounds;
        for p in &mut self.particles {
            p.step(bounds);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        let center = size * 0.5;
        surface.fill_radial_gradient(
            center,
            size.length() * 0.5,
            colors::VIGNETTE_CENTER,
            colors::VIGNETTE_EDGE,
        );

        if self.link_distance_sq > 0.0 {
            for (i, a) in self.particles.iter().enumerate() {
                for b in &self.particles[i + 1..] {
                    if a.pos.distance_squared(b.pos) < self.link_distance_sq {
                        surface.stroke_line(a.pos, b.pos, 0.5, colors::PARTICLE_LINK);
                    }
                }
            }
        }

        for p in &self.particles {
            surface.fill_circle(p.pos, p.radius, colors::PARTICLE);
        }
    }

    /// Tick then render. Without a surface the frame is skipped entirely.
    pub fn frame(&mut self, surface: Option<&mut dyn Surface>) {
        let Some(surface) = surface else {
            return;
        };
        self.tick();
        self.render(surface);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, DrawList};
    use proptest::prelude::*;

    fn field(width: f32, height: f32) -> ParticleField {
        ParticleField::new(width, height, &Settings::default(), 7)
    }

    #[test]
    fn test_count_scales_with_area_and_caps() {
        assert_eq!(particle_count(300.0, 300.0, 150), 10);
        assert_eq!(particle_count(1920.0, 1080.0, 150), 150);
        assert_eq!(particle_count(0.0, 500.0, 150), 0);
    }

    #[test]
    fn test_initialize_respects_ranges() {
        let f = field(800.0, 600.0);
        assert_eq!(f.particles().len(), 53);
        for p in f.particles() {
            assert!((0.0..=800.0).contains(&p.pos.x));
            assert!((0.0..=600.0).contains(&p.pos.y));
            assert!(p.vel.x.abs() <= PARTICLE_MAX_SPEED);
            assert!(p.vel.y.abs() <= PARTICLE_MAX_SPEED);
            assert!((PARTICLE_MIN_RADIUS..=PARTICLE_MAX_RADIUS).contains(&p.radius));
        }
    }

    #[test]
    fn test_resize_regenerates_batch() {
        let mut f = field(800.0, 600.0);
        f.resize(300.0, 300.0);
        assert_eq!(f.particles().len(), 10);
        assert_eq!(f.bounds(), Vec2::new(300.0, 300.0));
        assert!(f.particles().iter().all(|p| p.pos.x <= 300.0 && p.pos.y <= 300.0));
    }

    #[test]
    fn test_reflects_exactly_once_per_crossing() {
        let mut p = Particle {
            pos: Vec2::new(99.9, 50.0),
            vel: Vec2::new(0.25, 0.0),
            radius: 1.0,
        };
        p.step(Vec2::new(100.0, 100.0));
        assert_eq!(p.vel.x, -0.25);
        assert_eq!(p.pos.x, 100.0);

        // Moving back inward: no second flip
        p.step(Vec2::new(100.0, 100.0));
        assert_eq!(p.vel.x, -0.25);
        assert!(p.pos.x < 100.0);
    }

    #[test]
    fn test_render_links_close_pairs_only() {
        let mut f = field(300.0, 300.0);
        let still = |x, y| Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            radius: 1.0,
        };
        f.particles = vec![still(10.0, 10.0), still(50.0, 10.0), still(290.0, 290.0)];
        let mut list = DrawList::new(300.0, 300.0);
        f.render(&mut list);

        assert!(matches!(list.commands[0], DrawCommand::RadialGradient { .. }));
        assert_eq!(list.count_lines(), 1);
        assert_eq!(list.count_circles(), 3);
    }

    #[test]
    fn test_low_quality_settings_draw_no_links() {
        let settings = Settings::from_json(r#"{"quality":"Low"}"#).unwrap();
        let mut f = ParticleField::new(300.0, 300.0, &settings, 7);
        f.particles = vec![Particle {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            radius: 1.0,
        }; 2];
        let mut list = DrawList::new(300.0, 300.0);
        f.render(&mut list);
        assert_eq!(list.count_lines(), 0);
        assert_eq!(list.count_circles(), 2);
    }

    #[test]
    fn test_missing_surface_is_a_no_op() {
        let mut f = field(400.0, 400.0);
        let before = f.particles().to_vec();
        f.frame(None);
        assert_eq!(f.particles(), &before[..]);
    }

    proptest! {
        #[test]
        fn test_particles_stay_in_bounds(
            width in 50.0f32..2000.0,
            height in 50.0f32..2000.0,
            seed in any::<u64>(),
            ticks in 1usize..500,
        ) {
            let mut f = ParticleField::new(width, height, &Settings::default(), seed);
            for _ in 0..ticks {
                f.tick();
            }
            for p in f.particles() {
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= width);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y <= height);
            }
        }
    }
}
