//! Arcade easter egg
//!
//! A pellet-chasing maze game. The simulation is deterministic for a given
//! seed and input sequence:
//! - One tick per display frame, no wall-clock time
//! - Seeded RNG only
//! - Fixed iteration order (ghosts in [`Personality::ALL`] order)
//! - No rendering or platform dependencies outside [`render`], [`session`]
//!   and [`view`]

pub mod ghost;
pub mod grid;
pub mod input;
pub mod render;
pub mod session;
pub mod state;
pub mod tick;
pub mod view;

pub use grid::{Cell, Grid, MAZE_TEMPLATE};
pub use input::{Command, SwipeTracker, key_command};
pub use session::{ArcadeSession, CloseCallback, HudStatus};
pub use state::{
    Direction, GameEvent, GamePhase, GameState, Ghost, GhostMode, MAX_LEVEL, Personality, Player,
    SCARED_TICKS, START_LIVES,
};
pub use tick::{TickInput, tick};
pub use view::ArcadeView;
