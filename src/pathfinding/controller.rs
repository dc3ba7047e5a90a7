use crate::behavior::{Behavior, BehaviorContext};
use crate::components::SceneObject;
use crate::config::PathfindingBehaviorData;
use crate::config::range_types::CellSize;
use crate::pathfinding::astar::{MAX_COMPLEXITY_FACTOR, SearchOutcome, SearchRequest, find_path};
use crate::pathfinding::follower::{FollowState, FollowerSettings, PathFollower};
use crate::pathfinding::grid::{GridSpec, Viewpoint};
use crate::pathfinding::grid_cost::{CollisionMethod, MoverInflation, ObstacleFootprint};
use bevy::prelude::*;

/// Moves its scene object to requested destinations around registered obstacles.
///
/// [`PathfindingBehavior::move_to`] plans a route synchronously; the frame systems then
/// advance the object along it. A failed plan leaves no path and `path_found() == false`.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(SceneObject)]
pub struct PathfindingBehavior {
    data: PathfindingBehaviorData,
    follower: PathFollower,
    path_found: bool,
    activated: bool,
}

impl Default for PathfindingBehavior {
    fn default() -> Self {
        Self::from_data(PathfindingBehaviorData::default())
    }
}

impl PathfindingBehavior {
    pub fn from_data(data: PathfindingBehaviorData) -> Self {
        Self {
            data,
            follower: PathFollower::new(),
            path_found: false,
            activated: true,
        }
    }

    pub fn data(&self) -> &PathfindingBehaviorData {
        &self.data
    }

    fn grid(&self) -> GridSpec {
        let (width, height) = (self.data.cell_width.get(), self.data.cell_height.get());
        let grid = match self.data.viewpoint {
            Viewpoint::TopDown => GridSpec::new(width, height),
            Viewpoint::Isometry => GridSpec::isometric(width, height).unwrap_or_else(|| {
                warn!("Isometric cells must be wider than tall ({width}x{height}), using top-down");
                GridSpec::new(width, height)
            }),
        };
        grid.with_offset(self.grid_offset())
    }

    fn follower_settings(&self) -> FollowerSettings {
        FollowerSettings {
            acceleration: self.data.acceleration,
            max_speed: self.data.max_speed,
            angular_max_speed: self.data.angular_max_speed,
            rotate_object: self.data.rotate_object,
            angle_offset: self.data.angle_offset,
        }
    }

    /// Plan a route from the object's current position to (`x`, `y`)
    pub fn move_to(
        &mut self,
        object: &SceneObject,
        obstacles: &[ObstacleFootprint],
        x: f32,
        y: f32,
    ) -> bool {
        let method = self.data.collision_method;
        let request = SearchRequest {
            start: object.position,
            destination: Vec2::new(x, y),
            grid: self.grid(),
            allow_diagonals: self.data.allow_diagonals,
            inflation: MoverInflation::for_method(object, self.data.extra_border, method),
            collision: method,
            max_complexity_factor: MAX_COMPLEXITY_FACTOR,
        };

        match find_path(&request, obstacles) {
            SearchOutcome::Found(path) => {
                debug!("Path to ({x}, {y}) found with {} waypoints", path.len());
                self.follower.set_path(path);
                self.path_found = true;
            }
            SearchOutcome::NotFound(reason) => {
                debug!("No path to ({x}, {y}): {reason:?}");
                self.follower.clear();
                self.path_found = false;
            }
        }
        self.path_found
    }

    /// Advance the object along the current path
    pub fn step(&mut self, object: &mut SceneObject, delta_secs: f32) {
        let settings = self.follower_settings();
        self.follower.step(object, &settings, delta_secs);
    }

    pub fn path(&self) -> &[Vec2] {
        self.follower.path()
    }

    pub fn follow_state(&self) -> FollowState {
        self.follower.state()
    }

    pub fn path_found(&self) -> bool {
        self.path_found
    }

    pub fn destination_reached(&self) -> bool {
        self.follower.has_arrived()
    }

    pub fn node_count(&self) -> usize {
        self.path().len()
    }

    pub fn node(&self, index: usize) -> Option<Vec2> {
        self.path().get(index).copied()
    }

    pub fn node_x(&self, index: usize) -> f32 {
        self.node(index).map_or(0.0, |node| node.x)
    }

    pub fn node_y(&self, index: usize) -> f32 {
        self.node(index).map_or(0.0, |node| node.y)
    }

    /// Index of the waypoint being approached, or of the final one once past it
    pub fn next_node_index(&self) -> usize {
        let next = self.follower.current_segment() + 1;
        if next < self.node_count() {
            next
        } else {
            self.node_count().saturating_sub(1)
        }
    }

    fn next_node(&self) -> Option<Vec2> {
        self.node(self.next_node_index())
    }

    pub fn next_node_x(&self) -> f32 {
        self.next_node().map_or(0.0, |node| node.x)
    }

    pub fn next_node_y(&self) -> f32 {
        self.next_node().map_or(0.0, |node| node.y)
    }

    /// Waypoint most recently left behind
    fn last_node(&self) -> Option<Vec2> {
        if self.node_count() < 2 {
            return None;
        }
        let index = self.follower.current_segment().min(self.node_count() - 1);
        self.node(index)
    }

    pub fn last_node_x(&self) -> f32 {
        self.last_node().map_or(0.0, |node| node.x)
    }

    pub fn last_node_y(&self) -> f32 {
        self.last_node().map_or(0.0, |node| node.y)
    }

    pub fn destination_x(&self) -> f32 {
        self.path().last().map_or(0.0, |node| node.x)
    }

    pub fn destination_y(&self) -> f32 {
        self.path().last().map_or(0.0, |node| node.y)
    }

    pub fn speed(&self) -> f32 {
        self.follower.speed()
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.follower.set_speed(speed);
    }

    /// Direction of travel in degrees, 0 when not on a segment
    pub fn movement_angle(&self) -> f32 {
        self.follower.movement_angle()
    }

    pub fn allow_diagonals(&self) -> bool {
        self.data.allow_diagonals
    }

    pub fn set_allow_diagonals(&mut self, allow_diagonals: bool) {
        self.data.allow_diagonals = allow_diagonals;
    }

    pub fn acceleration(&self) -> f32 {
        self.data.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.data.acceleration = acceleration;
    }

    pub fn max_speed(&self) -> f32 {
        self.data.max_speed
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.data.max_speed = max_speed;
    }

    pub fn angular_max_speed(&self) -> f32 {
        self.data.angular_max_speed
    }

    pub fn set_angular_max_speed(&mut self, angular_max_speed: f32) {
        self.data.angular_max_speed = angular_max_speed;
    }

    pub fn rotate_object(&self) -> bool {
        self.data.rotate_object
    }

    pub fn set_rotate_object(&mut self, rotate_object: bool) {
        self.data.rotate_object = rotate_object;
    }

    pub fn angle_offset(&self) -> f32 {
        self.data.angle_offset
    }

    pub fn set_angle_offset(&mut self, angle_offset: f32) {
        self.data.angle_offset = angle_offset;
    }

    pub fn cell_width(&self) -> f32 {
        self.data.cell_width.get()
    }

    /// Ignored unless `cell_width > 0`
    pub fn set_cell_width(&mut self, cell_width: f32) {
        match CellSize::new(cell_width) {
            Some(size) => self.data.cell_width = size,
            None => warn!("Ignoring invalid cell width {cell_width}"),
        }
    }

    pub fn cell_height(&self) -> f32 {
        self.data.cell_height.get()
    }

    /// Ignored unless `cell_height > 0`
    pub fn set_cell_height(&mut self, cell_height: f32) {
        match CellSize::new(cell_height) {
            Some(size) => self.data.cell_height = size,
            None => warn!("Ignoring invalid cell height {cell_height}"),
        }
    }

    pub fn extra_border(&self) -> f32 {
        self.data.extra_border
    }

    pub fn set_extra_border(&mut self, extra_border: f32) {
        self.data.extra_border = extra_border;
    }

    pub fn grid_offset(&self) -> Vec2 {
        Vec2::new(self.data.grid_offset_x, self.data.grid_offset_y)
    }

    pub fn set_grid_offset(&mut self, offset: Vec2) {
        self.data.grid_offset_x = offset.x;
        self.data.grid_offset_y = offset.y;
    }

    pub fn viewpoint(&self) -> Viewpoint {
        self.data.viewpoint
    }

    /// Isometry only takes effect with cells wider than tall
    pub fn set_viewpoint(&mut self, viewpoint: Viewpoint) {
        self.data.viewpoint = viewpoint;
    }

    pub fn collision_method(&self) -> CollisionMethod {
        self.data.collision_method
    }

    pub fn set_collision_method(&mut self, collision_method: CollisionMethod) {
        self.data.collision_method = collision_method;
    }
}

impl Behavior for PathfindingBehavior {
    fn is_activated(&self) -> bool {
        self.activated
    }

    fn store_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    fn do_step_pre_events(&mut self, ctx: &mut BehaviorContext) {
        self.step(ctx.object, ctx.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover() -> SceneObject {
        SceneObject::point(Vec2::ZERO)
    }

    #[test]
    fn test_accessors_without_path() {
        let behavior = PathfindingBehavior::default();
        assert!(!behavior.path_found());
        assert!(!behavior.destination_reached());
        assert_eq!(behavior.node_count(), 0);
        assert_eq!(behavior.node_x(0), 0.0);
        assert_eq!(behavior.next_node_index(), 0);
        assert_eq!(behavior.next_node_x(), 0.0);
        assert_eq!(behavior.last_node_y(), 0.0);
        assert_eq!(behavior.destination_x(), 0.0);
        assert_eq!(behavior.movement_angle(), 0.0);
    }

    #[test]
    fn test_move_to_installs_path() {
        let mut behavior = PathfindingBehavior::default();
        assert!(behavior.move_to(&mover(), &[], 20.0, 80.0));

        assert!(behavior.path_found());
        assert!(!behavior.destination_reached());
        assert_eq!(behavior.node_count(), 5);
        assert_eq!((behavior.node_x(1), behavior.node_y(1)), (0.0, 20.0));
        assert_eq!(behavior.node_x(99), 0.0);
        assert_eq!(behavior.next_node_index(), 1);
        assert_eq!((behavior.next_node_x(), behavior.next_node_y()), (0.0, 20.0));
        assert_eq!((behavior.last_node_x(), behavior.last_node_y()), (0.0, 0.0));
        assert_eq!(
            (behavior.destination_x(), behavior.destination_y()),
            (20.0, 80.0)
        );
        assert_eq!(behavior.follow_state(), FollowState::OnSegment(0));
    }

    #[test]
    fn test_failed_move_clears_previous_path() {
        let mut behavior = PathfindingBehavior::default();
        behavior.move_to(&mover(), &[], 200.0, 0.0);
        assert!(behavior.path_found());

        let cage = ObstacleFootprint::new(Vec2::new(150.0, -50.0), Vec2::splat(100.0), 2.0, true);
        assert!(!behavior.move_to(&mover(), &[cage], 200.0, 0.0));
        assert!(!behavior.path_found());
        assert!(!behavior.destination_reached());
        assert_eq!(behavior.node_count(), 0);
        assert_eq!(behavior.follow_state(), FollowState::NoPath);
    }

    #[test]
    fn test_step_reaches_destination() {
        let mut behavior = PathfindingBehavior::default();
        let mut object = mover();
        behavior.move_to(&object, &[], 60.0, 0.0);

        for _ in 0..120 {
            behavior.step(&mut object, 1.0 / 60.0);
        }
        assert!(behavior.destination_reached());
        assert_eq!(object.position, Vec2::new(60.0, 0.0));
        assert_eq!(behavior.speed(), 0.0);
        assert_eq!(behavior.next_node_index(), behavior.node_count() - 1);
        assert_eq!(behavior.last_node_x(), 60.0);
    }

    #[test]
    fn test_invalid_cell_sizes_are_ignored() {
        let mut behavior = PathfindingBehavior::default();
        behavior.set_cell_width(0.0);
        behavior.set_cell_height(-5.0);
        assert_eq!(behavior.cell_width(), 20.0);
        assert_eq!(behavior.cell_height(), 20.0);

        behavior.set_cell_width(8.0);
        behavior.set_cell_height(12.5);
        assert_eq!(behavior.cell_width(), 8.0);
        assert_eq!(behavior.cell_height(), 12.5);
    }

    #[test]
    fn test_configuration_round_trips_through_setters() {
        let mut behavior = PathfindingBehavior::default();
        behavior.set_allow_diagonals(false);
        behavior.set_acceleration(50.0);
        behavior.set_max_speed(75.0);
        behavior.set_angular_max_speed(0.0);
        behavior.set_rotate_object(false);
        behavior.set_angle_offset(-90.0);
        behavior.set_extra_border(6.0);
        behavior.set_grid_offset(Vec2::new(10.0, 5.0));
        behavior.set_speed(12.0);
        behavior.set_viewpoint(Viewpoint::Isometry);
        behavior.set_collision_method(CollisionMethod::Aabb);

        assert_eq!(behavior.viewpoint(), Viewpoint::Isometry);
        assert_eq!(behavior.collision_method(), CollisionMethod::Aabb);
        assert!(!behavior.allow_diagonals());
        assert_eq!(behavior.acceleration(), 50.0);
        assert_eq!(behavior.max_speed(), 75.0);
        assert_eq!(behavior.angular_max_speed(), 0.0);
        assert!(!behavior.rotate_object());
        assert_eq!(behavior.angle_offset(), -90.0);
        assert_eq!(behavior.extra_border(), 6.0);
        assert_eq!(behavior.grid_offset(), Vec2::new(10.0, 5.0));
        assert_eq!(behavior.speed(), 12.0);
    }

    #[test]
    fn test_grid_offset_snaps_interior_waypoints() {
        let mut behavior = PathfindingBehavior::default();
        behavior.set_grid_offset(Vec2::new(5.0, 5.0));
        behavior.move_to(&mover(), &[], 105.0, 5.0);

        let interior = &behavior.path()[1..behavior.node_count() - 1];
        assert!(!interior.is_empty());
        for node in interior {
            assert_eq!((node.x - 5.0) % 20.0, 0.0);
            assert_eq!((node.y - 5.0) % 20.0, 0.0);
        }
    }

    #[test]
    fn test_isometric_viewpoint_uses_diamond_grid() {
        let mut behavior = PathfindingBehavior::default();
        behavior.set_cell_width(64.0);
        behavior.set_cell_height(32.0);
        behavior.set_viewpoint(Viewpoint::Isometry);
        assert!(behavior.move_to(&mover(), &[], 160.0, 80.0));

        // (160, 80) is the center of diamond (5, 0), reached along one row
        assert_eq!(behavior.node_count(), 6);
        let center = behavior.node(1).unwrap();
        assert!((center - Vec2::new(32.0, 16.0)).length() < 1e-3);
    }

    #[test]
    fn test_isometric_viewpoint_falls_back_on_tall_cells() {
        let mut behavior = PathfindingBehavior::default();
        behavior.set_viewpoint(Viewpoint::Isometry);
        assert!(behavior.move_to(&mover(), &[], 20.0, 80.0));
        assert_eq!(behavior.node_count(), 5);
        assert_eq!((behavior.node_x(1), behavior.node_y(1)), (0.0, 20.0));
    }
}
