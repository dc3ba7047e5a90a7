pub mod behavior;
pub mod components;
pub mod config;
pub mod errors;
pub mod pathfinding;
pub mod plugins;
pub mod scenario;

// Selective re-exports for external consumers

pub use behavior::{Behavior, BehaviorContext, set_behavior_activated};
pub use components::{ObjectTimeScale, SceneObject};
pub use config::{ObstacleData, PathfindingBehaviorData, PathfindingSettings};
pub use errors::{PathfindingError, PathfindingResult};
pub use pathfinding::{
    ObstacleCommandsExt, ObstacleField, ObstacleRegistry, PathfindingBehavior, PathfindingObstacle,
    set_obstacle_activated,
};
pub use plugins::*;
