use crate::behavior::{Behavior, BehaviorContext};
use crate::components::{ObjectTimeScale, SceneObject};
use crate::config::PathfindingSettings;
use crate::pathfinding::obstacles::{ObstacleRegistry, PathfindingObstacle};
use crate::pathfinding::{ObstacleField, PathfindingBehavior};
use bevy::prelude::*;

/// Ask the pathfinding behavior on `entity` to plan a route to (`x`, `y`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MoveToRequest {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
}

/// Frame phases behaviors run in
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorSet {
    /// `PreUpdate`, before game logic
    PreEvents,
    /// `PostUpdate`, after pending move requests are planned
    PostEvents,
}

pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObstacleRegistry>()
            .init_resource::<PathfindingSettings>()
            .add_event::<MoveToRequest>()
            .register_behavior::<PathfindingBehavior>()
            .register_behavior::<PathfindingObstacle>()
            .add_systems(
                PostUpdate,
                handle_move_to_requests.before(BehaviorSet::PostEvents),
            );

        #[cfg(debug_assertions)]
        app.add_systems(Last, check_registry_consistency);
    }
}

/// Hooks a behavior type into the frame loop
pub trait BehaviorAppExt {
    fn register_behavior<B: Behavior>(&mut self) -> &mut Self;
}

impl BehaviorAppExt for App {
    fn register_behavior<B: Behavior>(&mut self) -> &mut Self {
        self.add_systems(PreUpdate, step_pre_events::<B>.in_set(BehaviorSet::PreEvents))
            .add_systems(PostUpdate, step_post_events::<B>.in_set(BehaviorSet::PostEvents))
    }
}

type BehaviorItems<B> = (
    Entity,
    &'static mut B,
    &'static mut SceneObject,
    Option<&'static ObjectTimeScale>,
);

fn run_step<B: Behavior>(
    time: &Time,
    registry: &mut ObstacleRegistry,
    behaviors: &mut Query<BehaviorItems<B>>,
    step: fn(&mut B, &mut BehaviorContext),
) {
    let delta = time.delta_secs();
    for (entity, mut behavior, mut object, time_scale) in behaviors.iter_mut() {
        if !behavior.is_activated() {
            continue;
        }
        let mut ctx = BehaviorContext {
            entity,
            object: &mut *object,
            registry: &mut *registry,
            elapsed: time_scale.copied().unwrap_or_default().scaled(delta),
        };
        step(&mut *behavior, &mut ctx);
    }
}

fn step_pre_events<B: Behavior>(
    time: Res<Time>,
    mut registry: ResMut<ObstacleRegistry>,
    mut behaviors: Query<BehaviorItems<B>>,
) {
    run_step(&time, &mut registry, &mut behaviors, B::do_step_pre_events);
}

fn step_post_events<B: Behavior>(
    time: Res<Time>,
    mut registry: ResMut<ObstacleRegistry>,
    mut behaviors: Query<BehaviorItems<B>>,
) {
    run_step(&time, &mut registry, &mut behaviors, B::do_step_post_events);
}

fn handle_move_to_requests(
    mut requests: EventReader<MoveToRequest>,
    field: ObstacleField,
    mut movers: Query<(&mut PathfindingBehavior, &SceneObject)>,
) {
    let mut footprints = None;
    for request in requests.read() {
        let Ok((mut behavior, object)) = movers.get_mut(request.entity) else {
            warn!(
                "MoveTo ignored: {} has no pathfinding behavior",
                request.entity
            );
            continue;
        };
        if !behavior.is_activated() {
            debug!("MoveTo ignored: behavior on {} is deactivated", request.entity);
            continue;
        }

        let footprints = footprints.get_or_insert_with(|| field.footprints());
        behavior.move_to(object, footprints, request.x, request.y);
    }
}

/// Registry entries must be exactly the active obstacles at every frame boundary
#[cfg(debug_assertions)]
fn check_registry_consistency(
    registry: Res<ObstacleRegistry>,
    obstacles: Query<(Entity, &PathfindingObstacle)>,
) {
    for entity in registry.iter() {
        debug_assert!(
            obstacles
                .get(entity)
                .is_ok_and(|(_, obstacle)| obstacle.is_activated()),
            "registry lists {entity} which is not an active obstacle"
        );
    }
    for (entity, obstacle) in &obstacles {
        debug_assert!(
            !obstacle.is_activated() || registry.contains(entity),
            "active obstacle {entity} missing from registry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, PathfindingPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(125)));
        // First update only starts the clock
        app.update();
        app
    }

    #[test]
    fn test_plugin_registers_resources() {
        let app = app();
        assert!(app.world().contains_resource::<ObstacleRegistry>());
        assert!(app.world().contains_resource::<PathfindingSettings>());
    }

    #[test]
    fn test_move_request_then_follow() {
        let mut app = app();
        let mover = app
            .world_mut()
            .spawn((SceneObject::point(Vec2::ZERO), PathfindingBehavior::default()))
            .id();

        app.world_mut().send_event(MoveToRequest {
            entity: mover,
            x: 100.0,
            y: 0.0,
        });
        app.update();

        let behavior = app.world().get::<PathfindingBehavior>(mover).unwrap();
        assert!(behavior.path_found());
        assert_eq!(behavior.node_count(), 6);
        // Planned in PostUpdate, so the mover has not moved yet
        assert_eq!(app.world().get::<SceneObject>(mover).unwrap().position, Vec2::ZERO);

        app.update();
        let position = app.world().get::<SceneObject>(mover).unwrap().position;
        assert_eq!(position, Vec2::new(6.25, 0.0));

        for _ in 0..20 {
            app.update();
        }
        let behavior = app.world().get::<PathfindingBehavior>(mover).unwrap();
        assert!(behavior.destination_reached());
        assert_eq!(
            app.world().get::<SceneObject>(mover).unwrap().position,
            Vec2::new(100.0, 0.0)
        );
    }

    #[test]
    fn test_time_scale_and_deactivation() {
        let mut app = app();
        let world = app.world_mut();
        let mut slow = PathfindingBehavior::default();
        slow.move_to(&SceneObject::point(Vec2::ZERO), &[], 1000.0, 0.0);
        let slow = world
            .spawn((SceneObject::point(Vec2::ZERO), ObjectTimeScale(0.5), slow))
            .id();

        let mut idle = PathfindingBehavior::default();
        idle.move_to(&SceneObject::point(Vec2::ZERO), &[], 1000.0, 0.0);
        idle.store_activated(false);
        let idle = world.spawn((SceneObject::point(Vec2::ZERO), idle)).id();

        app.update();
        // 0.0625 s at 400 units/s^2 gives 25 units/s, so 1.5625 units
        let slow_x = app.world().get::<SceneObject>(slow).unwrap().position.x;
        assert!((slow_x - 1.5625).abs() < 1e-4);
        assert_eq!(app.world().get::<SceneObject>(idle).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_request_for_unknown_entity_is_ignored() {
        let mut app = app();
        let stray = app.world_mut().spawn(SceneObject::default()).id();
        app.world_mut().send_event(MoveToRequest {
            entity: stray,
            x: 10.0,
            y: 10.0,
        });
        app.update();
        assert!(app.world().get::<PathfindingBehavior>(stray).is_none());
    }
}
