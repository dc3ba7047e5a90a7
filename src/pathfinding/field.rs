//! Scene-level access to obstacles for route planning

use crate::components::SceneObject;
use crate::errors::{PathfindingError, PathfindingResult};
use crate::pathfinding::controller::PathfindingBehavior;
use crate::pathfinding::grid_cost::ObstacleFootprint;
use crate::pathfinding::obstacles::{ObstacleRegistry, PathfindingObstacle};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Read-only view of the scene's registered obstacles
#[derive(SystemParam)]
pub struct ObstacleField<'w, 's> {
    registry: Res<'w, ObstacleRegistry>,
    obstacles: Query<'w, 's, (&'static SceneObject, &'static PathfindingObstacle)>,
}

impl ObstacleField<'_, '_> {
    /// Current footprint of every registered obstacle
    pub fn footprints(&self) -> Vec<ObstacleFootprint> {
        self.registry.footprints(|entity| {
            self.obstacles
                .get(entity)
                .ok()
                .map(|(object, obstacle)| obstacle.footprint(object))
        })
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Plan a route for `behavior` from `object` to (`x`, `y`)
    pub fn move_to(
        &self,
        behavior: &mut PathfindingBehavior,
        object: &SceneObject,
        x: f32,
        y: f32,
    ) -> bool {
        behavior.move_to(object, &self.footprints(), x, y)
    }
}

/// Resolve footprints straight from a world
pub fn collect_footprints(world: &mut World) -> PathfindingResult<Vec<ObstacleFootprint>> {
    let mut obstacles = world.query::<(&SceneObject, &PathfindingObstacle)>();
    let registry = world
        .get_resource::<ObstacleRegistry>()
        .ok_or(PathfindingError::RegistryMissing)?;

    Ok(registry.footprints(|entity| {
        obstacles
            .get(world, entity)
            .ok()
            .map(|(object, obstacle)| obstacle.footprint(object))
    }))
}

/// Run `MoveTo` for `entity` outside of any system. Returns whether a path was found.
pub fn move_to_in_world(
    world: &mut World,
    entity: Entity,
    x: f32,
    y: f32,
) -> PathfindingResult<bool> {
    let footprints = collect_footprints(world)?;
    let mut movers = world.query::<(&mut PathfindingBehavior, &SceneObject)>();
    let (mut behavior, object) =
        movers
            .get_mut(world, entity)
            .map_err(|_| PathfindingError::MissingBehavior {
                entity,
                behavior: "PathfindingBehavior",
            })?;

    Ok(behavior.move_to(object, &footprints, x, y))
}
