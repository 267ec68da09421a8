//! Grid pathfinding used by fleeing combatants.
//!
//! Paths are requested through a [`PathService`] and delivered on a later
//! tick, so a decision never blocks on the search.

mod astar;
mod grid;
mod plan;
mod service;

pub use astar::{find_path, path_cost};
pub use grid::{GridError, Tile, TileGrid};
pub use plan::MovePlan;
pub use service::{DeferredPathfinder, PathPoll, PathService, PathTicket};
