//! Keyboard and touch steering

use glam::Vec2;

use super::state::Direction;

/// Minimum finger travel (px) along the dominant axis to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// What a key press asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Close,
}

/// Map a `KeyboardEvent.key` value to a command
pub fn key_command(key: &str) -> Option<Command> {
    match key {
        "ArrowUp" => Some(Command::Steer(Direction::Up)),
        "ArrowDown" => Some(Command::Steer(Direction::Down)),
        "ArrowLeft" => Some(Command::Steer(Direction::Left)),
        "ArrowRight" => Some(Command::Steer(Direction::Right)),
        "Escape" => Some(Command::Close),
        _ => None,
    }
}

/// Turns touch movement into swipe directions.
///
/// The origin resets after each recognised swipe, so one long drag can
/// steer several times.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    origin: Option<Vec2>,
}

impl SwipeTracker {
    pub fn start(&mut self, point: Vec2) {
        self.origin = Some(point);
    }

    /// Finger moved to `point`. Returns a direction once travel along the
    /// dominant axis passes [`SWIPE_THRESHOLD`].
    pub fn moved(&mut self, point: Vec2) -> Option<Direction> {
        let origin = self.origin?;
        let delta = point - origin;

        let dir = if delta.x.abs() >= delta.y.abs() {
            if delta.x.abs() <= SWIPE_THRESHOLD {
                return None;
            }
            if delta.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else {
            if delta.y.abs() <= SWIPE_THRESHOLD {
                return None;
            }
            // Screen y grows downward
            if delta.y > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            }
        };

        self.origin = Some(point);
        Some(dir)
    }

    pub fn end(&mut self) {
        self.origin = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }
}
