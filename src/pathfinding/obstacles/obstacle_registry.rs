//! Per-scene set of obstacles that searches read from

use crate::behavior::Behavior;
use crate::pathfinding::grid_cost::ObstacleFootprint;
use crate::pathfinding::obstacles::PathfindingObstacle;
use bevy::prelude::*;

/// Entities whose obstacle behavior is currently active, in registration order.
///
/// Membership is maintained by the obstacle component's hooks and activation callbacks,
/// never by hand. Obstacle data is not cached here: every search resolves fresh
/// footprints through [`ObstacleRegistry::footprints`].
///
/// Created through [`FromWorld`], the registry starts with the active obstacles already
/// present in the world, in entity order.
#[derive(Resource, Debug)]
pub struct ObstacleRegistry {
    entries: Vec<Entity>,
}

impl FromWorld for ObstacleRegistry {
    fn from_world(world: &mut World) -> Self {
        let mut obstacles = world.query::<(Entity, &PathfindingObstacle)>();
        let mut entries: Vec<Entity> = obstacles
            .iter(world)
            .filter(|(_, obstacle)| obstacle.is_activated())
            .map(|(entity, _)| entity)
            .collect();
        entries.sort();
        if !entries.is_empty() {
            debug!("Obstacle registry created with {} existing obstacles", entries.len());
        }
        Self { entries }
    }
}

impl ObstacleRegistry {
    /// Registry ignoring any obstacles already spawned
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an obstacle. Returns false if it was already registered.
    pub fn register(&mut self, entity: Entity) -> bool {
        let already_registered = self.contains(entity);
        debug_assert!(!already_registered, "obstacle {entity} registered twice");
        if already_registered {
            return false;
        }

        self.entries.push(entity);
        debug!("Obstacle {} registered ({} total)", entity, self.entries.len());
        true
    }

    /// Remove an obstacle. Returns false if it was not registered.
    pub fn unregister(&mut self, entity: Entity) -> bool {
        let Some(index) = self.entries.iter().position(|&e| e == entity) else {
            return false;
        };

        self.entries.remove(index);
        debug!("Obstacle {} unregistered ({} left)", entity, self.entries.len());
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entries.iter().copied()
    }

    /// Resolve the current footprint of every registered obstacle.
    ///
    /// An entry `resolve` cannot find means an obstacle vanished without leaving the
    /// registry. That trips a debug assertion and the entry is skipped otherwise.
    pub fn footprints<F>(&self, mut resolve: F) -> Vec<ObstacleFootprint>
    where
        F: FnMut(Entity) -> Option<ObstacleFootprint>,
    {
        self.entries
            .iter()
            .filter_map(|&entity| {
                let footprint = resolve(entity);
                debug_assert!(
                    footprint.is_some(),
                    "registered obstacle {entity} no longer resolves"
                );
                if footprint.is_none() {
                    warn!("Skipping dangling obstacle {}", entity);
                }
                footprint
            })
            .collect()
    }
}
