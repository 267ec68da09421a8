use crate::error::{ErrorSeverity, GameError};
use crate::geometry::{Rect, Vec2};

/// Grid cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub col: i32,
    pub row: i32,
}

impl Tile {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn manhattan(self, other: Tile) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid has no tiles")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile `{symbol}` at row {row}, column {col}")]
    UnknownTile { symbol: char, row: usize, col: usize },
}

impl GameError for GridError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "GRID_EMPTY",
            Self::RaggedRow { .. } => "GRID_RAGGED_ROW",
            Self::UnknownTile { .. } => "GRID_UNKNOWN_TILE",
        }
    }
}

/// Walkability and movement cost per tile.
///
/// Costs below 1 are raised to 1 so the Manhattan heuristic stays
/// admissible.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    cols: u32,
    rows: u32,
    tile_size: f64,
    walkable: Vec<bool>,
    cost: Vec<f64>,
}

impl TileGrid {
    pub const DEFAULT_TILE_SIZE: f64 = 16.0;

    /// Fully walkable grid with unit costs.
    pub fn open(cols: u32, rows: u32, tile_size: f64) -> Self {
        let len = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            tile_size,
            walkable: vec![true; len],
            cost: vec![1.0; len],
        }
    }

    /// Parses a grid drawn as text.
    ///
    /// `.` is floor, `#` is a wall and the digits `1`-`9` are floor with that
    /// movement cost.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], tile_size: f64) -> Result<Self, GridError> {
        let expected = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = Self::open(expected as u32, rows.len() as u32, tile_size);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let tile = Tile::new(col as i32, row as i32);
                match symbol {
                    '.' => {}
                    '#' => grid.set_walkable(tile, false),
                    '1'..='9' => {
                        let cost = symbol.to_digit(10).map(f64::from).unwrap_or(1.0);
                        grid.set_cost(tile, cost);
                    }
                    _ => return Err(GridError::UnknownTile { symbol, row, col }),
                }
            }
        }
        Ok(grid)
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// World rectangle covered by the grid.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.cols) * self.tile_size,
            f64::from(self.rows) * self.tile_size,
        )
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.col < 0 || tile.row < 0 {
            return None;
        }
        let (col, row) = (tile.col as u32, tile.row as u32);
        (col < self.cols && row < self.rows).then(|| (row * self.cols + col) as usize)
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.index(tile).is_some()
    }

    pub fn is_walkable(&self, tile: Tile) -> bool {
        self.index(tile).is_some_and(|index| self.walkable[index])
    }

    /// Movement cost of entering `tile`, `None` when it cannot be entered.
    pub fn cost(&self, tile: Tile) -> Option<f64> {
        let index = self.index(tile)?;
        self.walkable[index].then_some(self.cost[index])
    }

    pub fn set_walkable(&mut self, tile: Tile, walkable: bool) {
        if let Some(index) = self.index(tile) {
            self.walkable[index] = walkable;
        }
    }

    pub fn set_cost(&mut self, tile: Tile, cost: f64) {
        if let Some(index) = self.index(tile) {
            self.cost[index] = if cost.is_finite() { cost.max(1.0) } else { 1.0 };
        }
    }

    /// Tile under a world point, `None` off the grid.
    pub fn tile_at(&self, point: Vec2) -> Option<Tile> {
        if self.tile_size <= 0.0 || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let tile = Tile::new(
            (point.x / self.tile_size).floor() as i32,
            (point.y / self.tile_size).floor() as i32,
        );
        self.contains(tile).then_some(tile)
    }

    pub fn is_walkable_at(&self, point: Vec2) -> bool {
        self.tile_at(point).is_some_and(|tile| self.is_walkable(tile))
    }

    pub fn center_of(&self, tile: Tile) -> Vec2 {
        Vec2::new(
            (f64::from(tile.col) + 0.5) * self.tile_size,
            (f64::from(tile.row) + 0.5) * self.tile_size,
        )
    }

    /// Walkable orthogonal neighbors.
    pub fn neighbors(&self, tile: Tile) -> impl Iterator<Item = Tile> + '_ {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(move |(dc, dr)| Tile::new(tile.col + dc, tile.row + dr))
            .filter(|neighbor| self.is_walkable(*neighbor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_walls_and_costs() {
        let grid = TileGrid::from_rows(&["..#", ".3."], 16.0).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (3, 2));
        assert!(!grid.is_walkable(Tile::new(2, 0)));
        assert_eq!(grid.cost(Tile::new(1, 1)), Some(3.0));
        assert_eq!(grid.cost(Tile::new(2, 0)), None);
        assert_eq!(grid.bounds(), Rect::new(0.0, 0.0, 48.0, 32.0));
    }

    #[test]
    fn rejects_malformed_rows() {
        assert_eq!(
            TileGrid::from_rows(&["...", ".."], 16.0),
            Err(GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            TileGrid::from_rows(&[".x."], 16.0),
            Err(GridError::UnknownTile { symbol: 'x', .. })
        ));
        assert_eq!(TileGrid::from_rows::<&str>(&[], 16.0), Err(GridError::Empty));
    }

    #[test]
    fn maps_points_to_tiles() {
        let grid = TileGrid::open(4, 4, 16.0);
        assert_eq!(grid.tile_at(Vec2::new(17.0, 40.0)), Some(Tile::new(1, 2)));
        assert_eq!(grid.tile_at(Vec2::new(-1.0, 0.0)), None);
        assert_eq!(grid.tile_at(Vec2::new(64.0, 0.0)), None);
        assert_eq!(grid.center_of(Tile::new(1, 2)), Vec2::new(24.0, 40.0));
    }

    #[test]
    fn neighbors_skip_walls_and_edges() {
        let grid = TileGrid::from_rows(&[".#", ".."], 16.0).unwrap();
        let neighbors: Vec<Tile> = grid.neighbors(Tile::new(0, 0)).collect();
        assert_eq!(neighbors, vec![Tile::new(0, 1)]);
    }
}
