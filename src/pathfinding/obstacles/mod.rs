//! Obstacle behavior and the registry that mirrors its activation

use crate::behavior::{Behavior, BehaviorContext};
use crate::components::SceneObject;
use crate::config::ObstacleData;
use crate::config::range_types::ObstacleCost;
use crate::pathfinding::grid_cost::ObstacleFootprint;
use bevy::prelude::*;

pub mod membership;
pub mod obstacle_registry;

pub use membership::*;
pub use obstacle_registry::*;

/// Flags its scene object as blocking, or as making pathfinding more expensive.
///
/// While active and attached, the entity is listed in the scene's [`ObstacleRegistry`].
/// Inserting the component registers it, removing it or despawning the entity
/// unregisters it. Use [`set_obstacle_activated`] or [`ObstacleCommandsExt`] to toggle
/// activation so the registry stays in sync.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(SceneObject)]
#[component(on_insert = on_obstacle_insert, on_replace = on_obstacle_replace)]
pub struct PathfindingObstacle {
    cost: ObstacleCost,
    impassable: bool,
    activated: bool,
}

impl Default for PathfindingObstacle {
    fn default() -> Self {
        Self::from_data(&ObstacleData::default())
    }
}

impl PathfindingObstacle {
    pub fn from_data(data: &ObstacleData) -> Self {
        Self {
            cost: ObstacleCost::new(data.cost),
            impassable: data.impassable,
            activated: true,
        }
    }

    /// A wall nothing can cross
    pub fn impassable() -> Self {
        Self {
            impassable: true,
            ..default()
        }
    }

    /// Crossable terrain adding `cost` to every cell it covers
    pub fn passable(cost: f32) -> Self {
        Self {
            cost: ObstacleCost::new(cost),
            impassable: false,
            activated: true,
        }
    }

    /// Start out deactivated, so inserting does not register the obstacle
    pub fn inactive(mut self) -> Self {
        self.activated = false;
        self
    }

    pub fn cost(&self) -> f32 {
        self.cost.get()
    }

    /// Negative costs are clamped to zero
    pub fn set_cost(&mut self, cost: f32) {
        self.cost = ObstacleCost::new(cost);
    }

    pub fn is_impassable(&self) -> bool {
        self.impassable
    }

    pub fn set_impassable(&mut self, impassable: bool) {
        self.impassable = impassable;
    }

    pub fn footprint(&self, object: &SceneObject) -> ObstacleFootprint {
        ObstacleFootprint::from_object(object, self.cost(), self.impassable)
    }
}

impl Behavior for PathfindingObstacle {
    fn is_activated(&self) -> bool {
        self.activated
    }

    fn store_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    fn on_activate(&mut self, ctx: &mut BehaviorContext) {
        ctx.registry.register(ctx.entity);
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorContext) {
        ctx.registry.unregister(ctx.entity);
    }
}
