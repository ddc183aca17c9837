//! Botsite FX entry point
//!
//! On the web this wires the page effects to their elements. Natively it
//! runs a short headless session so the simulators can be watched in logs.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;

    use botsite_fx::Settings;
    use botsite_fx::web::{
        MountHandle, mount_parallax, mount_particle_field, mount_scroll_skew, mount_tilt,
    };

    /// Element ids the marketing page uses for each effect
    const PARTICLE_CANVAS_ID: &str = "particle-canvas";
    const SCROLL_CONTENT_ID: &str = "scroll-content";
    const HERO_PARALLAX_ID: &str = "hero-visual";
    const HERO_PARALLAX_SPEED: f32 = 0.15;
    const HERO_PARALLAX_ROTATION: f32 = 8.0;
    const TILT_CARD_IDS: [&str; 3] = ["feature-card-1", "feature-card-2", "feature-card-3"];

    thread_local! {
        // Page-lifetime effects; dropped (and torn down) with the page
        static MOUNTS: RefCell<Vec<MountHandle>> = const { RefCell::new(Vec::new()) };
    }

    fn keep(what: &str, mounted: Result<MountHandle, wasm_bindgen::JsValue>) {
        match mounted {
            Ok(m) => MOUNTS.with(|mounts| mounts.borrow_mut().push(m)),
            Err(e) => log::info!("{} not mounted: {:?}", what, e),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        let settings = Settings::load();
        log::info!(
            "Botsite FX starting (quality {}, reduced motion {})",
            settings.quality.as_str(),
            settings.reduced_motion
        );

        keep("Particle field", mount_particle_field(PARTICLE_CANVAS_ID));
        keep("Scroll skew", mount_scroll_skew(SCROLL_CONTENT_ID));
        keep(
            "Hero parallax",
            mount_parallax(HERO_PARALLAX_ID, HERO_PARALLAX_SPEED, HERO_PARALLAX_ROTATION),
        );
        for id in TILT_CARD_IDS {
            keep("Tilt card", mount_tilt(id, None));
        }

        log::info!(
            "Botsite FX running with {} effects",
            MOUNTS.with(|m| m.borrow().len())
        );
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1);
    log::info!("Botsite FX (native) headless run, seed {}", seed);

    run_particle_demo(seed);
    run_arcade_demo(seed);
}

/// Particle field on a manual frame source, one second of frames
#[cfg(not(target_arch = "wasm32"))]
fn run_particle_demo(seed: u64) {
    use std::cell::RefCell;
    use std::rc::Rc;

    use botsite_fx::Settings;
    use botsite_fx::frame::{ManualFrames, run_every_frame};
    use botsite_fx::particles::ParticleField;
    use botsite_fx::surface::{DrawList, Surface};

    let settings = Settings::default();
    let surface = Rc::new(RefCell::new(DrawList::new(1280.0, 720.0)));
    let field = Rc::new(RefCell::new(ParticleField::new(1280.0, 720.0, &settings, seed)));

    let frames = ManualFrames::new();
    let handle = {
        let surface = Rc::clone(&surface);
        let field = Rc::clone(&field);
        run_every_frame(Rc::clone(&frames), move |_time| {
            let mut surface = surface.borrow_mut();
            surface.reset();
            field.borrow_mut().frame(Some(&mut *surface as &mut dyn Surface));
        })
    };

    for i in 0..60 {
        frames.advance(i as f64 * 16.67);
    }
    let surface = surface.borrow();
    log::info!(
        "Particle field: {} particles, {} links in the last frame, {} frames",
        field.borrow().particles().len(),
        surface.count_lines(),
        handle.frames()
    );
    drop(handle);
    log::info!("Pending frames after teardown: {}", frames.pending_count());
}

/// Arcade view on a manual frame source with a fixed steering script,
/// closed with Escape once the game ends or times out
#[cfg(not(target_arch = "wasm32"))]
fn run_arcade_demo(seed: u64) {
    use std::rc::Rc;

    use botsite_fx::arcade::{ArcadeSession, ArcadeView, GamePhase};
    use botsite_fx::frame::ManualFrames;
    use botsite_fx::surface::DrawList;

    const SCRIPT: [&str; 4] = ["ArrowLeft", "ArrowUp", "ArrowRight", "ArrowDown"];
    const MAX_FRAMES: usize = 3600;

    let view = ArcadeView::new(ArcadeSession::new(seed, || log::info!("Game view closed")));
    let frames = ManualFrames::new();
    view.run(
        Rc::clone(&frames),
        Some(DrawList::new(380.0, 420.0)),
        |status| log::debug!("HUD {:?}", status),
    );

    let mut count = 0;
    while count < MAX_FRAMES && view.status().phase == GamePhase::Playing {
        if count % 90 == 0 {
            view.handle_key(SCRIPT[(count / 90) % SCRIPT.len()]);
        }
        frames.advance(count as f64 * 16.67);
        count += 1;
    }

    let status = view.status();
    log::info!(
        "Arcade after {} frames: score {}, lives {}, level {}, {:?}",
        count,
        status.score,
        status.lives,
        status.level,
        status.phase
    );
    view.handle_key("Escape");
    log::info!(
        "Arcade mounted after Escape: {}, pending frames: {}",
        view.is_mounted(),
        frames.pending_count()
    );
}
