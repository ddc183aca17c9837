//! Per-tick simulation
//!
//! One call to [`tick`] advances the game by a display frame: level check,
//! player movement, ghost movement, collisions. The phases are public so
//! they can be exercised one at a time.

use glam::Vec2;
use rand::Rng;

use super::ghost::{choose_direction, pursuit_target};
use super::grid::Cell;
use super::state::{
    Direction, GameEvent, GamePhase, GameState, GhostMode, MAX_LEVEL, ghost_speed_multiplier,
    player_speed_multiplier,
};

/// Base player speed (grid units per tick)
pub const PLAYER_SPEED: f32 = 0.12;
/// Base ghost speed while chasing
pub const GHOST_SPEED: f32 = 0.08;
/// Ghost speed while scared (not level-scaled)
pub const GHOST_SCARED_SPEED: f32 = 0.05;
/// Max distance from a cell center at which the player may turn
pub const PLAYER_TURN_TOLERANCE: f32 = 0.2;
/// Max distance from a cell center at which a ghost re-decides
pub const GHOST_TURN_TOLERANCE: f32 = 0.1;
/// How far past the next position the player checks for walls
pub const WALL_LOOK_AHEAD: f32 = 0.4;
/// Player/ghost contact distance
pub const COLLISION_DISTANCE: f32 = 0.6;
/// Chance per ghost decision of a teleport on the final level
pub const INSANE_TELEPORT_CHANCE: f64 = 0.01;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

/// Mouth animation speed (radians per tick of movement)
const MOUTH_SPEED: f32 = 0.3;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New steering request (arrow key or swipe)
    pub steer: Option<Direction>,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    if let Some(dir) = input.steer {
        state.player.queued = Some(dir);
    }

    if advance_level_if_cleared(state) {
        return;
    }

    update_player(state);
    update_ghosts(state);
    resolve_collisions(state);
}

/// Move to the next level (or win) once every pellet is gone.
/// Returns true if a transition happened.
pub fn advance_level_if_cleared(state: &mut GameState) -> bool {
    if state.pellets_remaining() > 0 {
        return false;
    }

    if state.level >= MAX_LEVEL {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Won);
        log::info!("Final level cleared, score {}", state.score);
    } else {
        let cleared = state.level;
        state.start_level(cleared + 1);
        state.events.push(GameEvent::LevelCleared(cleared));
        log::info!("Level {} cleared, starting level {}", cleared, state.level);
    }
    true
}

/// Steering, movement, wall handling and pellet pickup for the player
pub fn update_player(state: &mut GameState) {
    let speed = PLAYER_SPEED * player_speed_multiplier(state.level);
    let grid = &state.grid;
    let player = &mut state.player;

    // Commit the queued turn once close enough to a center
    if let Some(queued) = player.queued {
        let cell = grid.cell_at(player.pos);
        if player.dir == Some(queued) {
            // Already heading that way (key repeat); no snap
            player.queued = None;
        }
        let center = player.pos.round();
        let near = player.pos.distance(center) < PLAYER_TURN_TOLERANCE;
        if player.queued.is_some() && near && !grid.is_wall(cell + queued.offset()) {
            player.dir = Some(queued);
            player.pos = center;
            player.queued = None;
        }
    }

    if let Some(dir) = player.dir {
        let next = player.pos + dir.vec() * speed;
        let ahead = grid.cell_at(next + dir.vec() * WALL_LOOK_AHEAD);
        if grid.is_wall(ahead) {
            // Blocked: settle on the nearest center and wait for a new turn
            player.pos = player.pos.round();
        } else {
            player.pos = Vec2::new(grid.wrap_x(next.x), next.y);
            player.mouth_phase = (player.mouth_phase + MOUTH_SPEED) % std::f32::consts::TAU;
        }
        player.facing = dir.angle();
    }

    let cell = grid.cell_at(player.pos);
    match grid.get(cell) {
        Cell::Pellet => {
            state.grid.set(cell, Cell::Empty);
            state.score += PELLET_SCORE;
            state.events.push(GameEvent::PelletEaten);
        }
        Cell::PowerPellet => {
            state.grid.set(cell, Cell::Empty);
            state.score += POWER_PELLET_SCORE;
            for ghost in &mut state.ghosts {
                ghost.scare();
            }
            state.events.push(GameEvent::PowerPelletEaten);
        }
        Cell::Wall | Cell::Empty => {}
    }
}

/// Scared countdown, decisions at cell centers and movement for every ghost
pub fn update_ghosts(state: &mut GameState) {
    let chase_speed = GHOST_SPEED * ghost_speed_multiplier(state.level);
    let insane = state.level >= MAX_LEVEL;
    let grid = &state.grid;
    let player = &state.player;
    let rng = &mut state.rng;

    for ghost in &mut state.ghosts {
        if ghost.is_scared() {
            ghost.scared_ticks = ghost.scared_ticks.saturating_sub(1);
            if ghost.scared_ticks == 0 {
                ghost.mode = GhostMode::Chase;
            }
        }

        let speed = if ghost.is_scared() {
            GHOST_SCARED_SPEED
        } else {
            chase_speed
        };

        let cell = grid.cell_at(ghost.pos);
        let center = ghost.pos.round();
        let at_center = ghost.pos.distance(center) < GHOST_TURN_TOLERANCE;

        if at_center && ghost.last_decision != Some(cell) {
            ghost.last_decision = Some(cell);

            if insane && rng.random_bool(INSANE_TELEPORT_CHANCE) {
                if let Some(dest) = grid.random_open_cell(rng) {
                    log::debug!("{:?} ghost teleported to {}", ghost.personality, dest);
                    ghost.pos = dest.as_vec2();
                    ghost.dir = None;
                    ghost.last_decision = None;
                    continue;
                }
            }

            let target = pursuit_target(ghost.personality, ghost.is_scared(), player, grid, rng);
            ghost.pos = center;
            ghost.dir = choose_direction(grid, cell, ghost.dir, target);
        }

        if let Some(dir) = ghost.dir {
            let next = ghost.pos + dir.vec() * speed;
            ghost.pos = Vec2::new(grid.wrap_x(next.x), next.y);
        }
    }
}

/// Player/ghost contact: eat scared ghosts, otherwise lose a life
pub fn resolve_collisions(state: &mut GameState) {
    for i in 0..state.ghosts.len() {
        let ghost = &state.ghosts[i];
        if state.grid.wrapped_distance(ghost.pos, state.player.pos) >= COLLISION_DISTANCE {
            continue;
        }

        if ghost.is_scared() {
            let personality = ghost.personality;
            state.ghosts[i].respawn();
            state.score += GHOST_SCORE;
            state.events.push(GameEvent::GhostEaten(personality));
            continue;
        }

        state.lives = state.lives.saturating_sub(1);
        state.events.push(GameEvent::LifeLost);
        if state.lives == 0 {
            state.phase = GamePhase::GameOver;
            state.events.push(GameEvent::GameOver);
            log::info!("Game over at level {}, score {}", state.level, state.score);
        } else {
            log::info!("Life lost, {} remaining", state.lives);
            state.reset_agents();
        }
        return;
    }
}
