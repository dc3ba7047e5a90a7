//! Grid pathfinding for 2D scene objects.
//!
//! Obstacles are rasterized lazily onto a uniform grid, searched with A* and the
//! resulting waypoints are followed at bounded speed and acceleration.

pub mod astar;
pub mod controller;
pub mod field;
pub mod follower;
pub mod grid;
pub mod grid_cost;
pub mod obstacles;
pub mod open_set;

pub use astar::{NotFoundReason, SearchOutcome, SearchRequest, find_path};
pub use controller::PathfindingBehavior;
pub use field::{ObstacleField, collect_footprints, move_to_in_world};
pub use follower::{FollowState, FollowerSettings, PathFollower};
pub use grid::{CellCoord, GridBasis, GridSpec, Heuristic, Viewpoint};
pub use grid_cost::{CollisionMethod, GridCostModel, MoverInflation, ObstacleFootprint};
pub use obstacles::*;
