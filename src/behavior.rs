//! Object behaviors driven by the scene's frame loop

use crate::components::SceneObject;
use crate::errors::{PathfindingError, PathfindingResult};
use crate::pathfinding::obstacles::ObstacleRegistry;
use bevy::ecs::component::Mutable;
use bevy::prelude::*;

/// Scene state handed to a behavior for one callback
pub struct BehaviorContext<'a> {
    pub entity: Entity,
    pub object: &'a mut SceneObject,
    pub registry: &'a mut ObstacleRegistry,
    /// Seconds elapsed for this object since the previous frame
    pub elapsed: f32,
}

/// A component attached to a scene object that reacts to the object's lifecycle.
///
/// Deactivated behaviors are skipped by the frame systems. Toggling activation goes through
/// [`set_behavior_activated`] so the matching callback always runs.
pub trait Behavior: Component<Mutability = Mutable> {
    fn is_activated(&self) -> bool;

    /// Store the flag only; callers run the lifecycle callback
    fn store_activated(&mut self, activated: bool);

    fn on_activate(&mut self, _ctx: &mut BehaviorContext) {}

    fn on_deactivate(&mut self, _ctx: &mut BehaviorContext) {}

    fn do_step_pre_events(&mut self, _ctx: &mut BehaviorContext) {}

    fn do_step_post_events(&mut self, _ctx: &mut BehaviorContext) {}
}

/// Activate or deactivate behavior `B` on `entity`, running its lifecycle callback.
/// Setting the current state again does nothing.
pub fn set_behavior_activated<B: Behavior>(
    world: &mut World,
    entity: Entity,
    activated: bool,
) -> PathfindingResult<()> {
    world
        .try_resource_scope(|world, mut registry: Mut<ObstacleRegistry>| {
            let mut query = world.query::<(&mut B, &mut SceneObject)>();
            let Ok((mut behavior, mut object)) = query.get_mut(world, entity) else {
                return Err(PathfindingError::MissingBehavior {
                    entity,
                    behavior: std::any::type_name::<B>(),
                });
            };

            if behavior.is_activated() == activated {
                return Ok(());
            }

            behavior.store_activated(activated);
            let mut ctx = BehaviorContext {
                entity,
                object: &mut *object,
                registry: &mut *registry,
                elapsed: 0.0,
            };
            if activated {
                behavior.on_activate(&mut ctx);
            } else {
                behavior.on_deactivate(&mut ctx);
            }
            Ok(())
        })
        .ok_or(PathfindingError::RegistryMissing)?
}
