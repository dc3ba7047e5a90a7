//! Keeps registry membership equal to the set of active, attached obstacles

use crate::behavior::{Behavior, set_behavior_activated};
use crate::errors::PathfindingResult;
use crate::pathfinding::obstacles::{ObstacleRegistry, PathfindingObstacle};
use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;

/// Registers a freshly inserted obstacle if it is active
pub(crate) fn on_obstacle_insert(mut world: DeferredWorld, ctx: HookContext) {
    let activated = world
        .get::<PathfindingObstacle>(ctx.entity)
        .is_some_and(|obstacle| obstacle.is_activated());
    if !activated {
        return;
    }

    match world.get_resource_mut::<ObstacleRegistry>() {
        Some(mut registry) => {
            registry.register(ctx.entity);
        }
        None => debug!("No obstacle registry yet; {} joins it when created", ctx.entity),
    }
}

/// Runs before the component is overwritten, removed or despawned
pub(crate) fn on_obstacle_replace(mut world: DeferredWorld, ctx: HookContext) {
    if let Some(mut registry) = world.get_resource_mut::<ObstacleRegistry>() {
        registry.unregister(ctx.entity);
    }
}

/// Activate or deactivate the obstacle on `entity`, updating the registry immediately
pub fn set_obstacle_activated(
    world: &mut World,
    entity: Entity,
    activated: bool,
) -> PathfindingResult<()> {
    set_behavior_activated::<PathfindingObstacle>(world, entity, activated)
}

/// Deferred obstacle activation for systems
pub trait ObstacleCommandsExt {
    fn set_obstacle_activated(&mut self, activated: bool) -> &mut Self;
}

impl ObstacleCommandsExt for EntityCommands<'_> {
    fn set_obstacle_activated(&mut self, activated: bool) -> &mut Self {
        let entity = self.id();
        self.commands().queue(move |world: &mut World| {
            if let Err(err) = set_obstacle_activated(world, entity, activated) {
                warn!("Cannot change obstacle activation: {err}");
            }
        });
        self
    }
}
