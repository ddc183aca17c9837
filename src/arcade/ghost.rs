//! Ghost decision logic
//!
//! One shared algorithm for all four ghosts; behaviour differs only through
//! the [`Personality`] used to pick a target. Decisions are greedy: of the
//! legal non-reversing moves, take the one whose destination cell is
//! closest (squared distance) to the target.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::grid::Grid;
use super::state::{Direction, Personality, Player, direction_vec};

/// Cells ahead of the player the ambusher aims for
pub const AMBUSH_LEAD: f32 = 4.0;
/// Cells along the player's heading the flanker aims for (behind the player)
pub const FLANK_LEAD: f32 = -2.0;
/// Chance per decision that the erratic ghost picks a random target
pub const ERRATIC_WANDER_CHANCE: f64 = 0.3;

/// Where a ghost wants to go
pub fn pursuit_target<R: Rng>(
    personality: Personality,
    scared: bool,
    player: &Player,
    grid: &Grid,
    rng: &mut R,
) -> Vec2 {
    if scared {
        return grid.random_position(rng);
    }

    let heading = direction_vec(player.dir);
    match personality {
        Personality::Direct => player.pos,
        Personality::Ambush => player.pos + heading * AMBUSH_LEAD,
        Personality::Flank => player.pos + heading * FLANK_LEAD,
        Personality::Erratic => {
            if rng.random_bool(ERRATIC_WANDER_CHANCE) {
                grid.random_position(rng)
            } else {
                player.pos
            }
        }
    }
}

/// Pick the next direction from `cell`.
///
/// Reversing is only allowed when it is the sole legal move. `None` when
/// the cell is fully enclosed.
pub fn choose_direction(
    grid: &Grid,
    cell: IVec2,
    current: Option<Direction>,
    target: Vec2,
) -> Option<Direction> {
    let reverse = current.map(Direction::opposite);
    let legal = |d: &Direction| !grid.is_wall(cell + d.offset());

    let forward = Direction::ALL
        .into_iter()
        .filter(legal)
        .filter(|d| Some(*d) != reverse);

    closest_to(forward, cell, target).or_else(|| {
        // Dead end: reversing is forced
        closest_to(Direction::ALL.into_iter().filter(legal), cell, target)
    })
}

fn closest_to(
    candidates: impl Iterator<Item = Direction>,
    cell: IVec2,
    target: Vec2,
) -> Option<Direction> {
    candidates.min_by(|a, b| {
        let da = (cell + a.offset()).as_vec2().distance_squared(target);
        let db = (cell + b.offset()).as_vec2().distance_squared(target);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}
