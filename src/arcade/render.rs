//! Immediate-mode drawing of the maze, pellets and agents

use glam::{IVec2, Vec2};

use super::grid::Cell;
use super::state::{GameState, Ghost, Personality};
use crate::surface::{Color, Surface, colors};

/// Scared ghosts start blinking this many ticks before they recover
pub const BLINK_WARNING_TICKS: u32 = 120;
/// Widest mouth opening, radians on each side of the facing angle
const MAX_MOUTH: f32 = 0.8;

/// Maps grid units to surface pixels, keeping tiles square and the maze
/// centered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub tile: f32,
    pub offset: Vec2,
}

impl Layout {
    pub fn fit(surface_size: Vec2, cols: i32, rows: i32) -> Self {
        let cols = cols.max(1) as f32;
        let rows = rows.max(1) as f32;
        let tile = (surface_size.x / cols).min(surface_size.y / rows);
        let offset = (surface_size - Vec2::new(cols, rows) * tile) * 0.5;
        Self { tile, offset }
    }

    /// Pixel position of a grid-space point (cell centers are integers)
    pub fn to_screen(&self, pos: Vec2) -> Vec2 {
        self.offset + (pos + Vec2::splat(0.5)) * self.tile
    }

    fn cell_origin(&self, cell: IVec2) -> Vec2 {
        self.offset + cell.as_vec2() * self.tile
    }
}

/// Draw one frame of the game
pub fn render(state: &GameState, surface: &mut dyn Surface) {
    let layout = Layout::fit(surface.size(), state.grid.cols(), state.grid.rows());

    surface.clear(colors::BACKGROUND);
    draw_maze(state, &layout, surface);
    draw_player(state, &layout, surface);
    for ghost in &state.ghosts {
        draw_ghost(ghost, &layout, surface);
    }
}

fn draw_maze(state: &GameState, layout: &Layout, surface: &mut dyn Surface) {
    let tile = layout.tile;
    for (cell, contents) in state.grid.iter() {
        match contents {
            Cell::Wall => {
                surface.fill_rect(layout.cell_origin(cell), Vec2::splat(tile), colors::MAZE_WALL)
            }
            Cell::Pellet => {
                surface.fill_circle(layout.to_screen(cell.as_vec2()), tile * 0.1, colors::PELLET)
            }
            Cell::PowerPellet => {
                surface.fill_circle(layout.to_screen(cell.as_vec2()), tile * 0.3, colors::PELLET)
            }
            Cell::Empty => {}
        }
    }
}

fn draw_player(state: &GameState, layout: &Layout, surface: &mut dyn Surface) {
    let player = &state.player;
    // 0 (closed) ..= MAX_MOUTH (open)
    let mouth = player.mouth_phase.sin().abs() * MAX_MOUTH;
    surface.fill_wedge(
        layout.to_screen(player.pos),
        layout.tile * 0.45,
        player.facing + mouth,
        player.facing + std::f32::consts::TAU - mouth,
        colors::PLAYER,
    );
}

pub fn ghost_color(ghost: &Ghost) -> Color {
    if ghost.is_scared() {
        // Flash every 10 ticks near the end of the scared window
        let blink = ghost.scared_ticks < BLINK_WARNING_TICKS && (ghost.scared_ticks / 10) % 2 == 0;
        return if blink {
            colors::GHOST_SCARED_BLINK
        } else {
            colors::GHOST_SCARED
        };
    }
    match ghost.personality {
        Personality::Direct => colors::GHOST_DIRECT,
        Personality::Ambush => colors::GHOST_AMBUSH,
        Personality::Flank => colors::GHOST_FLANK,
        Personality::Erratic => colors::GHOST_ERRATIC,
    }
}

fn draw_ghost(ghost: &Ghost, layout: &Layout, surface: &mut dyn Surface) {
    let color = ghost_color(ghost);
    let center = layout.to_screen(ghost.pos);
    let r = layout.tile * 0.45;
    // Rounded head over a square skirt
    surface.fill_circle(center, r, color);
    surface.fill_rect(center - Vec2::new(r, 0.0), Vec2::new(r * 2.0, r), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::state::GhostMode;
    use crate::surface::{DrawCommand, DrawList};

    #[test]
    fn test_layout_keeps_tiles_square_and_centered() {
        let l = Layout::fit(Vec2::new(380.0, 840.0), 19, 21);
        assert_eq!(l.tile, 20.0);
        assert_eq!(l.offset, Vec2::new(0.0, 210.0));
        assert_eq!(l.to_screen(Vec2::ZERO), Vec2::new(10.0, 220.0));
    }

    #[test]
    fn test_renders_every_wall_and_pellet() {
        let state = GameState::new(1);
        let mut list = DrawList::new(190.0, 210.0);
        render(&state, &mut list);

        let walls = state.grid.iter().filter(|(_, c)| *c == Cell::Wall).count();
        let rects = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count();
        // One skirt rect per ghost
        assert_eq!(rects, walls + 4);
        // Pellets plus one head per ghost
        assert_eq!(list.count_circles(), state.pellets_remaining() + 4);
        assert!(matches!(list.commands[0], DrawCommand::Clear(_)));
    }

    #[test]
    fn test_player_mouth_opens_with_phase() {
        let mut state = GameState::new(1);
        state.player.mouth_phase = std::f32::consts::FRAC_PI_2;
        let mut list = DrawList::new(190.0, 210.0);
        render(&state, &mut list);

        let wedge = list
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Wedge { start, .. } => Some(*start),
                _ => None,
            })
            .unwrap();
        assert!((wedge - MAX_MOUTH).abs() < 1e-5);
    }

    #[test]
    fn test_scared_ghosts_blink_near_expiry() {
        let mut ghost = Ghost::new(Personality::Flank);
        assert_eq!(ghost_color(&ghost), colors::GHOST_FLANK);

        ghost.mode = GhostMode::Scared;
        ghost.scared_ticks = 400;
        assert_eq!(ghost_color(&ghost), colors::GHOST_SCARED);
        ghost.scared_ticks = 105;
        assert_eq!(ghost_color(&ghost), colors::GHOST_SCARED_BLINK);
        ghost.scared_ticks = 115;
        assert_eq!(ghost_color(&ghost), colors::GHOST_SCARED);
    }
}
