//! A* over the tile grid.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::grid::{Tile, TileGrid};

/// Node in the A* open set.
#[derive(Debug, Clone)]
struct PathNode {
    tile: Tile,
    f_cost: f64, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.tile == other.tile
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest 4-connected path from `start` to `goal`, both included.
///
/// The start tile may be blocked (a body standing on an edge); the goal must
/// be walkable. Returns `None` when no path exists.
pub fn find_path(grid: &TileGrid, start: Tile, goal: Tile) -> Option<Vec<Tile>> {
    if !grid.contains(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Tile, Tile> = HashMap::new();
    let mut g_scores: HashMap<Tile, f64> = HashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        tile: start,
        f_cost: f64::from(start.manhattan(goal)),
    });

    while let Some(current) = open_set.pop() {
        if current.tile == goal {
            return Some(reconstruct_path(&came_from, current.tile));
        }

        let current_g = *g_scores.get(&current.tile).unwrap_or(&f64::INFINITY);

        for neighbor in grid.neighbors(current.tile) {
            let Some(move_cost) = grid.cost(neighbor) else {
                continue;
            };

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f64::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.tile);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    tile: neighbor,
                    f_cost: tentative_g + f64::from(neighbor.manhattan(goal)),
                });
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<Tile, Tile>, mut current: Tile) -> Vec<Tile> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Sum of entry costs along `path`, excluding the start tile.
pub fn path_cost(grid: &TileGrid, path: &[Tile]) -> f64 {
    path.iter().skip(1).filter_map(|tile| grid.cost(*tile)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line() {
        let grid = TileGrid::open(6, 1, 16.0);
        let path = find_path(&grid, Tile::new(0, 0), Tile::new(5, 0)).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.first(), Some(&Tile::new(0, 0)));
        assert_eq!(path.last(), Some(&Tile::new(5, 0)));
    }

    #[test]
    fn goes_around_walls() {
        let grid = TileGrid::from_rows(&["..#..", "..#..", "....."], 16.0).unwrap();
        let path = find_path(&grid, Tile::new(0, 0), Tile::new(4, 0)).unwrap();
        assert!(!path.contains(&Tile::new(2, 0)));
        assert!(!path.contains(&Tile::new(2, 1)));
        assert!(path.contains(&Tile::new(2, 2)));
    }

    #[test]
    fn prefers_cheap_tiles() {
        let grid = TileGrid::from_rows(&[".9.", "..."], 16.0).unwrap();
        let path = find_path(&grid, Tile::new(0, 0), Tile::new(2, 0)).unwrap();
        assert!(!path.contains(&Tile::new(1, 0)));
        assert_eq!(path_cost(&grid, &path), 4.0);
    }

    #[test]
    fn walled_in_goal_has_no_path() {
        let grid = TileGrid::from_rows(&["..#.", "..##"], 16.0).unwrap();
        assert_eq!(find_path(&grid, Tile::new(0, 0), Tile::new(3, 0)), None);
        // goal on a wall
        assert_eq!(find_path(&grid, Tile::new(0, 0), Tile::new(2, 0)), None);
    }
}
