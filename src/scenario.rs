//! Headless pathfinding scenarios described in TOML

use crate::components::SceneObject;
use crate::config::{ObstacleData, PathfindingBehaviorData, PathfindingSettings};
use crate::errors::PathfindingResult;
use crate::pathfinding::{PathfindingBehavior, PathfindingObstacle};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The object being moved. `origin` is the offset from its drawable top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverSetup {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned obstacle given by its top-left corner. Unset flags use the settings defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSetup {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub impassable: Option<bool>,
    #[serde(default)]
    pub cost: Option<f32>,
    #[serde(default = "default_activated")]
    pub activated: bool,
}

fn default_activated() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub mover: MoverSetup,
    pub destination: Point,
    /// Replaces the settings' pathfinding defaults when present
    #[serde(default)]
    pub behavior: Option<PathfindingBehaviorData>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSetup>,
}

impl ObstacleSetup {
    fn data(&self, defaults: &ObstacleData) -> ObstacleData {
        ObstacleData {
            impassable: self.impassable.unwrap_or(defaults.impassable),
            cost: self.cost.unwrap_or(defaults.cost),
        }
    }
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> PathfindingResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> PathfindingResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Spawn the obstacles and the mover, returning the mover entity
    pub fn spawn(&self, world: &mut World, settings: &PathfindingSettings) -> Entity {
        for setup in &self.obstacles {
            let mut obstacle = PathfindingObstacle::from_data(&setup.data(&settings.obstacle));
            if !setup.activated {
                obstacle = obstacle.inactive();
            }
            world.spawn((
                SceneObject::new(
                    Vec2::new(setup.x, setup.y),
                    Vec2::new(setup.width, setup.height),
                ),
                obstacle,
            ));
        }
        debug!("Spawned {} scenario obstacles", self.obstacles.len());

        let mover = &self.mover;
        let data = self.behavior.unwrap_or(settings.pathfinding);
        let behavior = PathfindingBehavior::from_data(data);
        world
            .spawn((
                SceneObject::new(
                    Vec2::new(mover.x, mover.y),
                    Vec2::new(mover.width, mover.height),
                )
                .with_origin(Vec2::new(mover.origin_x, mover.origin_y)),
                behavior,
            ))
            .id()
    }
}
