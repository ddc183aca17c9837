//! Arcade game state
//!
//! Everything the engine mutates per tick lives in [`GameState`]. Nothing
//! here survives closing the game view.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Grid;

/// Lives at the start of a game
pub const START_LIVES: u8 = 3;
/// Clearing this level wins the game
pub const MAX_LEVEL: u32 = 5;
/// Ticks a power pellet keeps ghosts scared
pub const SCARED_TICKS: u32 = 500;

pub const PLAYER_START: IVec2 = IVec2::new(9, 15);

/// Player speed multiplier for levels 1..=5
const PLAYER_LEVEL_SPEED: [f32; 5] = [1.0, 1.05, 1.1, 1.15, 1.2];
/// Ghost chase speed multiplier for levels 1..=5
const GHOST_LEVEL_SPEED: [f32; 5] = [1.0, 1.15, 1.3, 1.45, 1.6];

fn level_index(level: u32) -> usize {
    (level.clamp(1, MAX_LEVEL) - 1) as usize
}

pub fn player_speed_multiplier(level: u32) -> f32 {
    PLAYER_LEVEL_SPEED[level_index(level)]
}

pub fn ghost_speed_multiplier(level: u32) -> f32 {
    GHOST_LEVEL_SPEED[level_index(level)]
}

/// Axis-aligned movement direction (screen space, +y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Candidate order for ghost decisions; earlier wins ties
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn vec(self) -> Vec2 {
        self.offset().as_vec2()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Facing angle in radians (0 = right, clockwise on screen)
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => -FRAC_PI_2,
        }
    }
}

/// Unit vector of an optional direction (zero when stopped)
pub fn direction_vec(dir: Option<Direction>) -> Vec2 {
    dir.map(Direction::vec).unwrap_or(Vec2::ZERO)
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Out of lives
    GameOver,
    /// Final level cleared
    Won,
}

/// The player-controlled agent
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Position in grid units (cell centers are integers)
    pub pos: Vec2,
    pub dir: Option<Direction>,
    /// Most recent steering request, held until it can legally commit
    pub queued: Option<Direction>,
    /// Mouth animation phase (radians, advances while moving)
    pub mouth_phase: f32,
    /// Facing angle in radians
    pub facing: f32,
}

impl Player {
    pub fn at(cell: IVec2) -> Self {
        Self {
            pos: cell.as_vec2(),
            dir: None,
            queued: None,
            mouth_phase: 0.0,
            facing: 0.0,
        }
    }
}

/// How a ghost picks its chase target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    /// Heads straight for the player
    Direct,
    /// Aims four cells ahead of the player
    Ambush,
    /// Aims two cells behind the player
    Flank,
    /// Sometimes wanders to a random cell
    Erratic,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Direct,
        Personality::Ambush,
        Personality::Flank,
        Personality::Erratic,
    ];

    /// Fixed start/home cell
    pub fn home(self) -> IVec2 {
        match self {
            Personality::Direct => IVec2::new(9, 7),
            Personality::Ambush => IVec2::new(9, 9),
            Personality::Flank => IVec2::new(8, 9),
            Personality::Erratic => IVec2::new(10, 9),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostMode {
    Chase,
    Scared,
}

/// An adversarial agent
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub personality: Personality,
    pub pos: Vec2,
    pub dir: Option<Direction>,
    pub mode: GhostMode,
    /// Ticks of scared mode left
    pub scared_ticks: u32,
    pub home: IVec2,
    /// Cell of the last direction decision; one decision per cell visit
    pub last_decision: Option<IVec2>,
}

impl Ghost {
    pub fn new(personality: Personality) -> Self {
        let home = personality.home();
        Self {
            personality,
            pos: home.as_vec2(),
            dir: None,
            mode: GhostMode::Chase,
            scared_ticks: 0,
            home,
            last_decision: None,
        }
    }

    pub fn is_scared(&self) -> bool {
        self.mode == GhostMode::Scared
    }

    pub fn scare(&mut self) {
        self.mode = GhostMode::Scared;
        self.scared_ticks = SCARED_TICKS;
    }

    /// Back to the home cell in chase mode
    pub fn respawn(&mut self) {
        *self = Ghost::new(self.personality);
    }
}

/// Things that happened during a tick, for HUD overlays and sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PelletEaten,
    PowerPelletEaten,
    GhostEaten(Personality),
    LifeLost,
    LevelCleared(u32),
    GameOver,
    Won,
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub grid: Grid,
    pub player: Player,
    pub ghosts: [Ghost; 4],
    pub score: u32,
    pub lives: u8,
    /// 1-based level index
    pub level: u32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised by the latest tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// New game at level 1 with full lives
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid: Grid::standard(),
            player: Player::at(PLAYER_START),
            ghosts: Personality::ALL.map(Ghost::new),
            score: 0,
            lives: START_LIVES,
            level: 1,
            phase: GamePhase::Playing,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Reseed the maze and agents for `level`; score and lives carry over
    pub fn start_level(&mut self, level: u32) {
        self.level = level;
        self.grid = Grid::standard();
        self.reset_agents();
    }

    /// Player and ghosts back to their start cells; pellets stay eaten
    pub fn reset_agents(&mut self) {
        self.player = Player::at(PLAYER_START);
        for ghost in &mut self.ghosts {
            ghost.respawn();
        }
    }

    pub fn pellets_remaining(&self) -> usize {
        self.grid.pellet_count()
    }
}
