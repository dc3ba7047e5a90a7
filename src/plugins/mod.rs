pub mod pathfinding;

pub use pathfinding::*;
