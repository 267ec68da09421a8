use std::collections::VecDeque;

use crate::geometry::{Vec2, distance};

use super::grid::{Tile, TileGrid};

/// Waypoints being walked, nearest first.
///
/// A waypoint is reached once the walker is within the tolerance or has
/// crossed the line through the waypoint perpendicular to the leg leading to
/// it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovePlan {
    waypoints: VecDeque<Vec2>,
    /// Start of the leg toward the front waypoint.
    leg_start: Option<Vec2>,
}

impl MovePlan {
    /// Walks through the centers of `tiles`, skipping the tile the walker
    /// already stands on.
    pub fn from_tiles(grid: &TileGrid, tiles: &[Tile]) -> Self {
        Self {
            waypoints: tiles.iter().skip(1).map(|tile| grid.center_of(*tile)).collect(),
            leg_start: None,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: points.into_iter().collect(),
            leg_start: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    /// Drops reached waypoints and returns the next one to head for.
    pub fn next_waypoint(&mut self, position: Vec2, tolerance: f64) -> Option<Vec2> {
        while let Some(next) = self.waypoints.front().copied() {
            let start = *self.leg_start.get_or_insert(position);
            let reached = distance(position, next) <= tolerance || passed(start, next, position);
            if !reached {
                return Some(next);
            }
            self.waypoints.pop_front();
            self.leg_start = Some(next);
        }
        None
    }
}

/// Whether `position` lies beyond `to` along the leg `from -> to`.
fn passed(from: Vec2, to: Vec2, position: Vec2) -> bool {
    let leg = to - from;
    let along = position - to;
    leg.x * along.x + leg.y * along.y >= 0.0 && !leg.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_start_tile_and_reached_points() {
        let grid = TileGrid::open(4, 1, 16.0);
        let tiles = [Tile::new(0, 0), Tile::new(1, 0), Tile::new(2, 0)];
        let mut plan = MovePlan::from_tiles(&grid, &tiles);
        assert_eq!(plan.remaining(), 2);

        assert_eq!(plan.next_waypoint(Vec2::new(8.0, 8.0), 2.0), Some(Vec2::new(24.0, 8.0)));
        assert_eq!(plan.next_waypoint(Vec2::new(23.0, 8.0), 2.0), Some(Vec2::new(40.0, 8.0)));
        assert_eq!(plan.next_waypoint(Vec2::new(40.0, 9.0), 2.0), None);
        assert!(plan.is_finished());
    }

    #[test]
    fn overshooting_a_waypoint_counts_as_reaching_it() {
        let mut plan = MovePlan::from_points([Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]);
        assert_eq!(plan.next_waypoint(Vec2::ZERO, 2.0), Some(Vec2::new(10.0, 0.0)));
        // 3 px past the first waypoint, well outside the tolerance
        assert_eq!(
            plan.next_waypoint(Vec2::new(13.0, 0.0), 2.0),
            Some(Vec2::new(10.0, 10.0))
        );
        assert_eq!(plan.remaining(), 1);
    }

    #[test]
    fn long_steps_still_finish_the_walk() {
        let grid = TileGrid::open(10, 10, 16.0);
        let tiles: Vec<Tile> = (0..8).map(|i| Tile::new(i, i / 2)).collect();
        let mut plan = MovePlan::from_tiles(&grid, &tiles);
        let mut position = grid.center_of(tiles[0]);
        // speed 64 at 100 ms ticks
        let step = 6.4;

        let mut ticks = 0;
        while let Some(waypoint) = plan.next_waypoint(position, 2.0) {
            position = position + (waypoint - position).with_length(step);
            ticks += 1;
            assert!(ticks < 100, "walk never finished");
        }
        assert!(distance(position, grid.center_of(tiles[7])) <= step);
    }
}
