use bevy::prelude::*;

/// Position and size provider for anything the pathfinding layer moves or avoids.
///
/// `position` is the object's reference point. The drawable (top-left) corner sits at
/// `position - origin`, so an object with a centered origin has `origin = size / 2`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneObject {
    pub position: Vec2,
    pub origin: Vec2,
    pub size: Vec2,
    /// Orientation in degrees
    pub angle: f32,
}

impl SceneObject {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            origin: Vec2::ZERO,
            size,
            angle: 0.0,
        }
    }

    /// Zero-sized object, handy for point movers
    pub fn point(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO)
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn drawable_position(&self) -> Vec2 {
        self.position - self.origin
    }

    /// World rectangle covered by the drawable area
    pub fn bounds(&self) -> Rect {
        let min = self.drawable_position();
        Rect::from_corners(min, min + self.size)
    }

    /// Axis-aligned box around the drawable area once rotated by `angle` about its center
    pub fn aabb(&self) -> Rect {
        let bounds = self.bounds();
        if self.angle.rem_euclid(360.0) == 0.0 {
            return bounds;
        }
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let half = bounds.half_size();
        let extent = Vec2::new(
            cos.abs() * half.x + sin.abs() * half.y,
            sin.abs() * half.x + cos.abs() * half.y,
        );
        Rect::from_center_half_size(bounds.center(), extent)
    }

    /// Turn toward `target` degrees at `speed` degrees per second.
    ///
    /// A zero speed snaps immediately. Otherwise the object turns the short way round and
    /// lands exactly on `target` when this step would reach or pass it.
    pub fn rotate_toward_angle(&mut self, target: f32, speed: f32, delta_secs: f32) {
        if speed == 0.0 {
            self.angle = target;
            return;
        }

        let diff = angle_difference(self.angle, target);
        let diff_was_positive = diff >= 0.0;
        let step = speed * delta_secs;
        let new_angle = if diff_was_positive {
            self.angle - step
        } else {
            self.angle + step
        };

        self.angle = if (angle_difference(new_angle, target) > 0.0) ^ diff_was_positive {
            target
        } else {
            new_angle
        };
    }
}

/// Signed difference `a - b` in degrees, normalized to [-180, 180)
pub fn angle_difference(a: f32, b: f32) -> f32 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Per-object multiplier applied to the frame's elapsed time
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ObjectTimeScale(pub f32);

impl Default for ObjectTimeScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl ObjectTimeScale {
    pub fn scaled(self, delta_secs: f32) -> f32 {
        delta_secs * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawable_position_and_bounds() {
        let object = SceneObject::new(Vec2::new(100.0, 50.0), Vec2::new(32.0, 16.0))
            .with_origin(Vec2::new(16.0, 8.0));

        assert_eq!(object.drawable_position(), Vec2::new(84.0, 42.0));
        let bounds = object.bounds();
        assert_eq!(bounds.min, Vec2::new(84.0, 42.0));
        assert_eq!(bounds.max, Vec2::new(116.0, 58.0));
    }

    #[test]
    fn test_aabb_follows_rotation() {
        let object = SceneObject::new(Vec2::new(100.0, 50.0), Vec2::new(40.0, 20.0));
        assert_eq!(object.aabb(), object.bounds());
        assert_eq!(object.with_angle(360.0).aabb(), object.bounds());

        let upright = object.with_angle(90.0).aabb();
        assert!((upright.min - Vec2::new(110.0, 40.0)).length() < 1e-4);
        assert!((upright.max - Vec2::new(130.0, 80.0)).length() < 1e-4);

        let tilted = object.with_angle(45.0).aabb();
        assert!((tilted.center() - Vec2::new(120.0, 60.0)).length() < 1e-4);
        assert!((tilted.width() - 30.0 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert_eq!(angle_difference(10.0, 350.0), 20.0);
        assert_eq!(angle_difference(350.0, 10.0), -20.0);
        assert_eq!(angle_difference(90.0, 90.0), 0.0);
        assert_eq!(angle_difference(180.0, 0.0), -180.0);
    }

    #[test]
    fn test_rotate_toward_angle_steps_short_way() {
        let mut object = SceneObject::default().with_angle(350.0);
        object.rotate_toward_angle(20.0, 10.0, 1.0);
        assert!((object.angle - 360.0).abs() < 1e-4);

        let mut object = SceneObject::default().with_angle(20.0);
        object.rotate_toward_angle(350.0, 10.0, 1.0);
        assert!((object.angle - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_toward_angle_snaps_on_overshoot() {
        let mut object = SceneObject::default().with_angle(0.0);
        object.rotate_toward_angle(15.0, 180.0, 0.5);
        assert_eq!(object.angle, 15.0);

        // Already on target stays on target
        object.rotate_toward_angle(15.0, 180.0, 0.5);
        assert_eq!(object.angle, 15.0);
    }

    #[test]
    fn test_rotate_toward_angle_zero_speed_snaps() {
        let mut object = SceneObject::default().with_angle(45.0);
        object.rotate_toward_angle(-120.0, 0.0, 0.016);
        assert_eq!(object.angle, -120.0);
    }

    #[test]
    fn test_object_time_scale() {
        assert_eq!(ObjectTimeScale::default().scaled(0.5), 0.5);
        assert_eq!(ObjectTimeScale(2.0).scaled(0.25), 0.5);
    }
}
