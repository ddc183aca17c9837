//! Game session as seen by the UI shell
//!
//! Owns the [`GameState`], buffers input between frames and reports HUD
//! status. The shell supplies a close callback. Closing (Escape or a
//! victory claim) only marks the session; whoever owns it takes the
//! callback with [`ArcadeSession::take_close_callback`] and runs it once no
//! borrow of the session is held. [`super::view::ArcadeView`] does this.

use glam::Vec2;
use serde::Serialize;

use super::input::{Command, SwipeTracker, key_command};
use super::render::render;
use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{TickInput, tick};
use crate::settings::Settings;
use crate::surface::Surface;

/// Score, lives, level and outcome for the HUD overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudStatus {
    pub score: u32,
    pub lives: u8,
    pub level: u32,
    pub phase: GamePhase,
}

/// Notifies the shell that the game view closed
pub type CloseCallback = Box<dyn FnOnce()>;

pub struct ArcadeSession {
    state: GameState,
    base_seed: u64,
    restarts: u64,
    input: TickInput,
    swipe: SwipeTracker,
    on_close: Option<CloseCallback>,
    closed: bool,
    warned_no_surface: bool,
}

impl ArcadeSession {
    pub fn new(seed: u64, on_close: impl FnOnce() + 'static) -> Self {
        log::info!("Arcade session started with seed {}", seed);
        Self {
            state: GameState::new(seed),
            base_seed: seed,
            restarts: 0,
            input: TickInput::default(),
            swipe: SwipeTracker::default(),
            on_close: Some(Box::new(on_close)),
            closed: false,
            warned_no_surface: false,
        }
    }

    /// Use the configured seed if there is one, else `fallback_seed`
    pub fn from_settings(
        settings: &Settings,
        fallback_seed: u64,
        on_close: impl FnOnce() + 'static,
    ) -> Self {
        Self::new(settings.arcade_seed.unwrap_or(fallback_seed), on_close)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Key-down handler. Returns true if the key was used; a closed
    /// session uses none.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if self.closed {
            return false;
        }
        match key_command(key) {
            Some(Command::Steer(dir)) => {
                self.input.steer = Some(dir);
                true
            }
            Some(Command::Close) => {
                self.close();
                true
            }
            None => false,
        }
    }

    pub fn touch_start(&mut self, point: Vec2) {
        self.swipe.start(point);
    }

    pub fn touch_move(&mut self, point: Vec2) {
        if let Some(dir) = self.swipe.moved(point) {
            self.input.steer = Some(dir);
        }
    }

    pub fn touch_end(&mut self) {
        self.swipe.end();
    }

    /// Run one tick and draw it.
    ///
    /// Nothing happens without a surface or after close; the buffered
    /// steering is kept for the next frame that does run.
    pub fn frame(&mut self, surface: Option<&mut dyn Surface>) -> Vec<GameEvent> {
        if self.closed {
            return Vec::new();
        }
        let Some(surface) = surface else {
            if !self.warned_no_surface {
                log::warn!("Arcade canvas has no drawing context, skipping frames");
                self.warned_no_surface = true;
            }
            return Vec::new();
        };

        let input = std::mem::take(&mut self.input);
        tick(&mut self.state, &input);
        render(&self.state, surface);

        let events = std::mem::take(&mut self.state.events);
        for event in &events {
            match event {
                GameEvent::PelletEaten => {}
                GameEvent::GhostEaten(p) => log::debug!("{:?} ghost eaten", p),
                other => log::debug!("Game event: {:?}", other),
            }
        }
        events
    }

    pub fn status(&self) -> HudStatus {
        HudStatus {
            score: self.state.score,
            lives: self.state.lives,
            level: self.state.level,
            phase: self.state.phase,
        }
    }

    /// HUD status as JSON for the shell
    pub fn status_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.status())
    }

    /// Start a new game. Each restart gets its own seed derived from the
    /// session seed.
    pub fn restart(&mut self) {
        self.restarts += 1;
        let seed = self.base_seed.wrapping_add(self.restarts);
        self.state = GameState::new(seed);
        self.input = TickInput::default();
        self.swipe.end();
        log::info!("Arcade restarted (seed {})", seed);
    }

    /// Mark the view closed. Idempotent; the close callback is handed out
    /// by [`Self::take_close_callback`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        log::info!("Arcade closed at level {}, score {}", self.state.level, self.state.score);
    }

    /// The close callback, at most once and only after the session closed
    pub fn take_close_callback(&mut self) -> Option<CloseCallback> {
        if !self.closed {
            return None;
        }
        self.on_close.take()
    }

    /// Leave after winning. Returns false (and stays open) unless the game
    /// is won.
    pub fn claim_victory(&mut self) -> bool {
        if self.state.phase != GamePhase::Won {
            return false;
        }
        self.close();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::grid::Cell;
    use crate::arcade::state::Direction;
    use crate::surface::DrawList;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    fn session_with_counter() -> (ArcadeSession, Rc<StdCell<u32>>) {
        let closes = Rc::new(StdCell::new(0));
        let counter = closes.clone();
        let session = ArcadeSession::new(42, move || counter.set(counter.get() + 1));
        (session, closes)
    }

    fn run_close_callback(s: &mut ArcadeSession) {
        if let Some(on_close) = s.take_close_callback() {
            on_close();
        }
    }

    #[test]
    fn test_escape_hands_out_callback_once() {
        let (mut s, closes) = session_with_counter();
        assert!(s.take_close_callback().is_none());

        assert!(s.handle_key("Escape"));
        assert!(s.is_closed());
        // Closing does not run the callback itself
        assert_eq!(closes.get(), 0);

        run_close_callback(&mut s);
        s.close();
        s.handle_key("Escape");
        run_close_callback(&mut s);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_closed_session_ignores_keys() {
        let (mut s, _) = session_with_counter();
        s.handle_key("Escape");
        assert!(!s.handle_key("ArrowDown"));
        assert!(!s.handle_key("Escape"));
    }

    #[test]
    fn test_closed_session_stops_ticking() {
        let (mut s, _) = session_with_counter();
        let mut list = DrawList::new(190.0, 210.0);
        s.frame(Some(&mut list));
        s.close();
        list.reset();
        s.frame(Some(&mut list));
        assert!(list.commands.is_empty());
        assert_eq!(s.state().time_ticks, 1);
    }

    #[test]
    fn test_missing_surface_skips_frame_and_keeps_input() {
        let (mut s, _) = session_with_counter();
        s.handle_key("ArrowLeft");
        assert!(s.frame(None).is_empty());
        assert_eq!(s.state().time_ticks, 0);

        let mut list = DrawList::new(190.0, 210.0);
        s.frame(Some(&mut list));
        assert_eq!(s.state().player.dir, Some(Direction::Left));
        assert!(!list.commands.is_empty());
    }

    #[test]
    fn test_swipe_steers_player() {
        let (mut s, _) = session_with_counter();
        s.touch_start(Vec2::new(200.0, 200.0));
        s.touch_move(Vec2::new(260.0, 205.0));
        s.touch_end();
        let mut list = DrawList::new(190.0, 210.0);
        s.frame(Some(&mut list));
        assert_eq!(s.state().player.dir, Some(Direction::Right));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (mut s, _) = session_with_counter();
        assert!(!s.handle_key("Enter"));
        assert!(!s.is_closed());
        assert!(s.take_close_callback().is_none());
    }

    #[test]
    fn test_victory_claim_requires_win() {
        let (mut s, closes) = session_with_counter();
        assert!(!s.claim_victory());
        assert!(!s.is_closed());

        s.state.phase = GamePhase::Won;
        assert!(s.claim_victory());
        assert!(s.is_closed());
        run_close_callback(&mut s);
        s.claim_victory();
        run_close_callback(&mut s);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_status_reports_hud_values() {
        let (mut s, _) = session_with_counter();
        // Eat the pellet left of the start cell
        s.state.grid.set(glam::IVec2::new(8, 15), Cell::Pellet);
        s.handle_key("ArrowLeft");
        let mut list = DrawList::new(190.0, 210.0);
        let mut events = Vec::new();
        for _ in 0..6 {
            events.extend(s.frame(Some(&mut list)));
        }
        assert!(events.contains(&GameEvent::PelletEaten));

        let status = s.status();
        assert_eq!(status.score, 10);
        assert_eq!(status.lives, 3);
        assert_eq!(status.level, 1);
        assert_eq!(status.phase, GamePhase::Playing);

        let json = s.status_json().unwrap();
        assert_eq!(json, r#"{"score":10,"lives":3,"level":1,"phase":"Playing"}"#);
    }

    #[test]
    fn test_restart_starts_a_fresh_game() {
        let (mut s, _) = session_with_counter();
        s.state.score = 500;
        s.state.lives = 1;
        s.restart();
        assert_eq!(s.status().score, 0);
        assert_eq!(s.status().lives, 3);
        assert_eq!(s.state().seed, 43);
    }

    #[test]
    fn test_configured_seed_wins() {
        let settings = Settings {
            arcade_seed: Some(7),
            ..Settings::default()
        };
        let s = ArcadeSession::from_settings(&settings, 99, || {});
        assert_eq!(s.state().seed, 7);
        let s = ArcadeSession::from_settings(&Settings::default(), 99, || {});
        assert_eq!(s.state().seed, 99);
    }
}
