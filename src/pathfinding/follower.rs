use crate::components::SceneObject;
use bevy::prelude::*;

/// Kinematic limits applied while following a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerSettings {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Degrees per second
    pub angular_max_speed: f32,
    pub rotate_object: bool,
    /// Added to the segment direction before turning the object, in degrees
    pub angle_offset: f32,
}

impl Default for FollowerSettings {
    fn default() -> Self {
        Self {
            acceleration: 400.0,
            max_speed: 200.0,
            angular_max_speed: 180.0,
            rotate_object: true,
            angle_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    NoPath,
    /// Travelling from waypoint `i` to waypoint `i + 1`
    OnSegment(usize),
    Arrived,
}

/// Moves an object along a waypoint list one frame at a time.
///
/// A segment's duration equals its length, and progress accumulates `speed * dt`, so the
/// follower covers a segment once it has integrated that much distance. Progress beyond
/// the segment end is dropped when the next segment starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathFollower {
    path: Vec<Vec2>,
    current_segment: usize,
    time_on_segment: f32,
    total_segment_time: f32,
    speed: f32,
    reached_end: bool,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active path and restart at its first segment. Speed carries over.
    pub fn set_path(&mut self, path: Vec<Vec2>) {
        self.path = path;
        self.current_segment = 0;
        self.time_on_segment = 0.0;
        self.total_segment_time = 0.0;
        self.reached_end = false;
        self.enter_segment(0);
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.current_segment = 0;
        self.time_on_segment = 0.0;
        self.total_segment_time = 0.0;
        self.reached_end = false;
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn state(&self) -> FollowState {
        if self.path.is_empty() {
            FollowState::NoPath
        } else if self.reached_end {
            FollowState::Arrived
        } else {
            FollowState::OnSegment(self.current_segment)
        }
    }

    pub fn has_arrived(&self) -> bool {
        self.reached_end
    }

    pub fn current_segment(&self) -> usize {
        self.current_segment
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Direction of the current segment in degrees, or 0 without one
    pub fn movement_angle(&self) -> f32 {
        self.segment_angle().unwrap_or(0.0)
    }

    fn segment_angle(&self) -> Option<f32> {
        let from = self.path.get(self.current_segment)?;
        let to = self.path.get(self.current_segment + 1)?;
        let delta = *to - *from;
        Some(delta.y.atan2(delta.x).to_degrees())
    }

    fn enter_segment(&mut self, segment: usize) {
        if self.path.is_empty() {
            return;
        }

        self.current_segment = segment;
        if segment + 1 < self.path.len() {
            self.total_segment_time = self.path[segment].distance(self.path[segment + 1]);
            self.time_on_segment = 0.0;
            self.reached_end = false;
        } else {
            self.reached_end = true;
            self.speed = 0.0;
        }
    }

    /// Advance `object` by one frame of `delta_secs`
    pub fn step(&mut self, object: &mut SceneObject, settings: &FollowerSettings, delta_secs: f32) {
        if self.path.is_empty() || self.reached_end {
            return;
        }

        self.speed = (self.speed + settings.acceleration * delta_secs).min(settings.max_speed);

        self.time_on_segment += self.speed * delta_secs;
        if self.time_on_segment >= self.total_segment_time {
            self.enter_segment(self.current_segment + 1);
        }

        let mut path_angle = object.angle;
        if self.current_segment + 1 < self.path.len() {
            let from = self.path[self.current_segment];
            let to = self.path[self.current_segment + 1];
            let ratio = if self.total_segment_time > 0.0 {
                self.time_on_segment / self.total_segment_time
            } else {
                1.0
            };
            object.position = from + (to - from) * ratio;
            if let Some(angle) = self.segment_angle() {
                path_angle = angle + settings.angle_offset;
            }
        } else if let Some(last) = self.path.last() {
            object.position = *last;
        }

        if settings.rotate_object {
            object.rotate_toward_angle(path_angle, settings.angular_max_speed, delta_secs);
        }
    }
}
