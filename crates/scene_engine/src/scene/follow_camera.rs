//! Pivot-follow camera
//!
//! The camera hangs off a pivot transform at a fixed offset. Each frame the
//! pivot is rotated by the arrow keys and moved onto the tracked entity, and
//! the camera, being the pivot's child, is carried along.
//!
//! Rotation happens with the camera detached. Re-attaching then keeps the
//! camera's local offset, which now sits on the rotated pivot, so the
//! camera swings around the entity instead of spinning in place.

use crate::config::CameraSettings;
use crate::foundation::math::Vec3;
use crate::input::{InputState, KeyCode};

use super::camera::Camera;
use super::transform::{TransformGraph, TransformId};

/// Camera orbiting a pivot that tracks a target transform
#[derive(Debug, Clone)]
pub struct FollowCamera {
    camera: Camera,
    pivot: TransformId,
    target: TransformId,
    orbit_step: f32,
    last_displacement: Vec3,
}

impl FollowCamera {
    /// Create the pivot at the target's world position with the camera
    /// `follow_distance` behind it
    pub fn new(transforms: &mut TransformGraph, target: TransformId, aspect: f32, settings: &CameraSettings) -> Self {
        let start = transforms.world_position(target).unwrap_or_else(Vec3::zeros);
        let pivot = transforms.create_at(start);
        let camera = Camera::new(transforms, Vec3::new(0.0, 0.0, settings.follow_distance), aspect, settings);
        transforms.add_child(pivot, camera.transform());

        let mut follow = Self {
            camera,
            pivot,
            target,
            orbit_step: settings.orbit_step,
            last_displacement: Vec3::zeros(),
        };
        follow.camera.update_view_matrix(transforms);
        follow
    }

    /// The camera being carried
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the carried camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Pivot transform
    pub fn pivot(&self) -> TransformId {
        self.pivot
    }

    /// Tracked transform
    pub fn target(&self) -> TransformId {
        self.target
    }

    /// How far the pivot moved during the last update
    pub fn last_displacement(&self) -> Vec3 {
        self.last_displacement
    }

    /// Orbit with the arrow keys, re-center on the target and rebuild the view
    pub fn update(&mut self, input: &InputState, transforms: &mut TransformGraph) {
        let camera = self.camera.transform();
        transforms.remove_child(self.pivot, camera);

        let mut orbit = Vec3::zeros();
        if input.key_down(KeyCode::Right) { orbit.y += self.orbit_step; }
        if input.key_down(KeyCode::Left) { orbit.y -= self.orbit_step; }
        if input.key_down(KeyCode::Up) { orbit.x += self.orbit_step; }
        if input.key_down(KeyCode::Down) { orbit.x -= self.orbit_step; }
        if orbit != Vec3::zeros() {
            transforms.rotate(self.pivot, orbit);
        }

        transforms.add_child(self.pivot, camera);

        let previous = transforms.position(self.pivot).unwrap_or_else(Vec3::zeros);
        if let Some(target) = transforms.world_position(self.target) {
            transforms.set_position(self.pivot, target);
            self.last_displacement = target - previous;
        }

        self.camera.update_view_matrix(transforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rig() -> (TransformGraph, TransformId, FollowCamera) {
        let mut transforms = TransformGraph::new();
        let target = transforms.create_at(Vec3::new(2.0, 0.0, 0.0));
        let follow = FollowCamera::new(&mut transforms, target, 1.0, &CameraSettings::default());
        (transforms, target, follow)
    }

    #[test]
    fn test_camera_starts_behind_target() {
        let (transforms, _, follow) = rig();
        let camera = follow.camera().transform();

        assert_eq!(transforms.parent(camera), Some(follow.pivot()));
        assert_relative_eq!(transforms.world_position(camera).unwrap(), Vec3::new(2.0, 0.0, 15.0), epsilon = 1e-5);
    }

    #[test]
    fn test_pivot_tracks_moving_target() {
        let (mut transforms, target, mut follow) = rig();
        transforms.move_absolute(target, Vec3::new(0.0, 3.0, 0.0));

        follow.update(&InputState::new(), &mut transforms);

        let camera = follow.camera().transform();
        assert_relative_eq!(follow.last_displacement(), Vec3::new(0.0, 3.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(transforms.world_position(camera).unwrap(), Vec3::new(2.0, 3.0, 15.0), epsilon = 1e-5);
        assert_eq!(transforms.index_of_child(follow.pivot(), camera), Some(0));
    }

    #[test]
    fn test_arrow_keys_orbit_at_constant_distance() {
        let (mut transforms, _, mut follow) = rig();
        let mut input = InputState::new();
        input.set_key(KeyCode::Right, true);

        for _ in 0..500 {
            follow.update(&input, &mut transforms);
        }

        let camera = transforms.world_position(follow.camera().transform()).unwrap();
        let pivot = transforms.world_position(follow.pivot()).unwrap();
        assert_relative_eq!((camera - pivot).norm(), 15.0, epsilon = 1e-3);
        assert_relative_eq!(transforms.pitch_yaw_roll(follow.pivot()).unwrap().y, 0.5, epsilon = 1e-4);
        assert!(camera.x > pivot.x);
    }
}
