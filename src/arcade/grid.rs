//! Maze grid
//!
//! Cells are addressed by `IVec2 { x: column, y: row }`. Columns wrap
//! horizontally (the tunnel row is open at both edges); rows outside the
//! grid read as walls.

use glam::{IVec2, Vec2};
use rand::Rng;

/// Contents of one maze tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Pellet,
    PowerPellet,
    Empty,
}

impl Cell {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Cell::Wall),
            '.' => Some(Cell::Pellet),
            'o' => Some(Cell::PowerPellet),
            ' ' => Some(Cell::Empty),
            _ => None,
        }
    }

    pub fn is_pellet(self) -> bool {
        matches!(self, Cell::Pellet | Cell::PowerPellet)
    }
}

/// The level maze. Every level starts from this template.
///
/// `#` wall, `.` pellet, `o` power pellet, space empty. Row 9 is the tunnel.
pub const MAZE_TEMPLATE: [&str; 21] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#       #.####",
    "####.# ## ## #.####",
    "    .  #   #  .    ",
    "####.# ##### #.####",
    "####.#       #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
    /// Non-wall cells; walls never change during a level
    open: Vec<IVec2>,
}

impl Grid {
    /// Build a grid from template rows.
    ///
    /// # Panics
    /// On ragged rows or unknown characters: templates are compiled in, so
    /// a bad one is a programming error.
    pub fn from_template(rows: &[&str]) -> Self {
        let cols = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(cols * rows.len());
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.chars().count(), cols, "maze row {} has wrong width", y);
            for c in row.chars() {
                let cell = Cell::from_char(c)
                    .unwrap_or_else(|| panic!("unknown maze character {:?} in row {}", c, y));
                cells.push(cell);
            }
        }

        let cols = cols as i32;
        let open = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != Cell::Wall)
            .map(|(i, _)| IVec2::new(i as i32 % cols, i as i32 / cols))
            .collect();

        Self {
            cols,
            rows: rows.len() as i32,
            cells,
            open,
        }
    }

    /// Fresh copy of the standard maze
    pub fn standard() -> Self {
        Self::from_template(&MAZE_TEMPLATE)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        if cell.y < 0 || cell.y >= self.rows || self.cols == 0 {
            return None;
        }
        let x = cell.x.rem_euclid(self.cols);
        Some((cell.y * self.cols + x) as usize)
    }

    /// Cell contents; columns wrap, rows out of range are walls
    pub fn get(&self, cell: IVec2) -> Cell {
        self.index(cell).map(|i| self.cells[i]).unwrap_or(Cell::Wall)
    }

    pub fn set(&mut self, cell: IVec2, value: Cell) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = value;
        }
    }

    pub fn is_wall(&self, cell: IVec2) -> bool {
        self.get(cell) == Cell::Wall
    }

    /// Remaining pellets and power pellets
    pub fn pellet_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_pellet()).count()
    }

    pub fn open_cells(&self) -> &[IVec2] {
        &self.open
    }

    /// Wrap a continuous x coordinate through the tunnel.
    ///
    /// Keeps `x` inside `[-0.5, cols - 0.5]`.
    pub fn wrap_x(&self, x: f32) -> f32 {
        let width = self.cols as f32;
        if x < -0.5 {
            x + width
        } else if x > width - 0.5 {
            x - width
        } else {
            x
        }
    }

    /// Distance between two positions, the short way round through the
    /// tunnel
    pub fn wrapped_distance(&self, a: Vec2, b: Vec2) -> f32 {
        let width = self.cols as f32;
        let dx = (a.x - b.x).abs().rem_euclid(width.max(1.0));
        Vec2::new(dx.min(width - dx), a.y - b.y).length()
    }

    /// Nearest cell to a continuous position, with the column wrapped
    pub fn cell_at(&self, pos: Vec2) -> IVec2 {
        let cell = pos.round().as_ivec2();
        IVec2::new(cell.x.rem_euclid(self.cols.max(1)), cell.y)
    }

    /// Uniformly random in-bounds position (cell centers only)
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(0..self.cols) as f32,
            rng.random_range(0..self.rows) as f32,
        )
    }

    /// Uniformly random non-wall cell
    pub fn random_open_cell<R: Rng>(&self, rng: &mut R) -> Option<IVec2> {
        if self.open.is_empty() {
            return None;
        }
        Some(self.open[rng.random_range(0..self.open.len())])
    }

    /// Iterate `(cell, contents)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (IVec2::new(i as i32 % cols, i as i32 / cols), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_standard_maze_dimensions() {
        let g = Grid::standard();
        assert_eq!(g.cols(), 19);
        assert_eq!(g.rows(), 21);
        assert!(g.pellet_count() > 100);
    }

    #[test]
    fn test_four_power_pellets() {
        let g = Grid::standard();
        let power = g.iter().filter(|(_, c)| *c == Cell::PowerPellet).count();
        assert_eq!(power, 4);
        assert_eq!(g.get(IVec2::new(1, 2)), Cell::PowerPellet);
        assert_eq!(g.get(IVec2::new(17, 15)), Cell::PowerPellet);
    }

    #[test]
    fn test_tunnel_wraps_columns() {
        let g = Grid::standard();
        assert_eq!(g.get(IVec2::new(-1, 9)), Cell::Empty);
        assert_eq!(g.get(IVec2::new(19, 9)), Cell::Empty);
        assert_eq!(g.get(IVec2::new(-1, 5)), Cell::Wall);
    }

    #[test]
    fn test_rows_out_of_range_are_walls() {
        let g = Grid::standard();
        assert!(g.is_wall(IVec2::new(3, -1)));
        assert!(g.is_wall(IVec2::new(3, 21)));
    }

    #[test]
    fn test_wrap_x_stays_on_real_columns() {
        let g = Grid::standard();
        assert!((g.wrap_x(-0.6) - 18.4).abs() < 1e-5);
        assert!((g.wrap_x(18.6) - -0.4).abs() < 1e-5);
        assert_eq!(g.wrap_x(3.2), 3.2);
        assert_eq!(g.cell_at(Vec2::new(-0.4, 9.0)), IVec2::new(0, 9));
        assert_eq!(g.cell_at(Vec2::new(-0.5, 9.0)), IVec2::new(18, 9));
    }

    #[test]
    fn test_wrapped_distance_goes_through_tunnel() {
        let g = Grid::standard();
        let d = g.wrapped_distance(Vec2::new(-0.45, 9.0), Vec2::new(18.45, 9.0));
        assert!((d - 0.1).abs() < 1e-4);
        assert!((g.wrapped_distance(Vec2::new(3.0, 9.0), Vec2::new(5.0, 9.0)) - 2.0).abs() < 1e-6);
        assert!((g.wrapped_distance(Vec2::new(1.0, 1.0), Vec2::new(1.0, 4.0)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_consumes_pellet() {
        let mut g = Grid::standard();
        let before = g.pellet_count();
        g.set(IVec2::new(1, 1), Cell::Empty);
        assert_eq!(g.pellet_count(), before - 1);
    }

    #[test]
    fn test_random_open_cell_is_never_wall() {
        let g = Grid::standard();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let c = g.random_open_cell(&mut rng).unwrap();
            assert!(!g.is_wall(c));
        }
    }

    #[test]
    #[should_panic(expected = "wrong width")]
    fn test_ragged_template_panics() {
        Grid::from_template(&["###", "#."]);
    }
}
