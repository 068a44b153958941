//! # First-Person Camera
//!
//! A camera is a node in the transform graph plus projection parameters.
//! Its view matrix is rebuilt from the node's world matrix, so a camera
//! parented under another transform (see the follow rig) sees through that
//! hierarchy without extra bookkeeping.
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera looks down its local -Z axis.
//!
//! ## Controls
//! | Input | Effect |
//! |---|---|
//! | W / S | forward / back along the view direction |
//! | A / D | strafe left / right |
//! | Space / X | straight up / down in world space |
//! | Shift / Control | 5x / 0.1x speed |
//! | Left mouse drag | yaw and pitch, pitch clamped short of vertical |

use crate::config::CameraSettings;
use crate::foundation::math::{constants::HALF_PI, utils, Mat4, Point3, Vec3};
use crate::input::{InputState, KeyCode, MouseButton};

use super::transform::{TransformGraph, TransformId};

/// Radians of rotation per pixel of mouse travel at look speed 1
const LOOK_RADIANS_PER_PIXEL: f32 = 0.005;

/// Pitch stays this far from straight up or down
const PITCH_MARGIN: f32 = 0.01;

/// Perspective camera attached to a transform node
#[derive(Debug, Clone)]
pub struct Camera {
    transform: TransformId,
    view: Mat4,
    projection: Mat4,
    fov: f32,
    near: f32,
    far: f32,
    aspect: f32,
    move_speed: f32,
    look_speed: f32,
}

impl Camera {
    /// Create a camera at `position` with its own root transform
    pub fn new(transforms: &mut TransformGraph, position: Vec3, aspect: f32, settings: &CameraSettings) -> Self {
        let transform = transforms.create_at(position);
        let mut camera = Self {
            transform,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            fov: utils::deg_to_rad(settings.fov_degrees),
            near: settings.near,
            far: settings.far,
            aspect: 1.0,
            move_speed: settings.move_speed,
            look_speed: settings.look_speed,
        };
        camera.update_projection_matrix(aspect);
        camera.update_view_matrix(transforms);
        camera
    }

    /// Transform node the camera looks from
    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// World-to-view matrix as of the last update
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// View-to-clip matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Width over height used by the projection
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Rebuild the projection for a new aspect ratio
    ///
    /// Non-positive or non-finite ratios, as produced by a minimised
    /// window, are ignored.
    pub fn update_projection_matrix(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::debug!("Ignoring invalid aspect ratio {aspect}");
            return;
        }
        self.aspect = aspect;
        self.projection = Mat4::new_perspective(aspect, self.fov, self.near, self.far);
    }

    /// Rebuild the view matrix from the transform's world pose
    pub fn update_view_matrix(&mut self, transforms: &TransformGraph) {
        let Some(world) = transforms.world_matrix(self.transform) else {
            return;
        };

        let eye = Point3::new(world.m14, world.m24, world.m34);
        let forward = world.transform_vector(&Vec3::new(0.0, 0.0, -1.0)).normalize();
        let up = world.transform_vector(&Vec3::y()).normalize();
        self.view = Mat4::look_at_rh(&eye, &(eye + forward), &up);
    }

    /// Apply first-person controls for this frame, then rebuild the view
    pub fn update(&mut self, delta_time: f32, input: &InputState, transforms: &mut TransformGraph) {
        let mut speed = delta_time * self.move_speed;
        if input.key_down(KeyCode::LeftShift) {
            speed *= 5.0;
        }
        if input.key_down(KeyCode::LeftControl) {
            speed *= 0.1;
        }

        let mut relative = Vec3::zeros();
        if input.key_down(KeyCode::W) { relative.z -= speed; }
        if input.key_down(KeyCode::S) { relative.z += speed; }
        if input.key_down(KeyCode::A) { relative.x -= speed; }
        if input.key_down(KeyCode::D) { relative.x += speed; }
        if relative != Vec3::zeros() {
            transforms.move_relative(self.transform, relative);
        }

        let mut vertical = 0.0;
        if input.key_down(KeyCode::Space) { vertical += speed; }
        if input.key_down(KeyCode::X) { vertical -= speed; }
        if vertical != 0.0 {
            transforms.move_absolute(self.transform, Vec3::new(0.0, vertical, 0.0));
        }

        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta() * self.look_speed * LOOK_RADIANS_PER_PIXEL;
            if delta.x != 0.0 || delta.y != 0.0 {
                transforms.rotate(self.transform, Vec3::new(-delta.y, -delta.x, 0.0));
                self.clamp_pitch(transforms);
            }
        }

        self.update_view_matrix(transforms);
    }

    fn clamp_pitch(&self, transforms: &mut TransformGraph) {
        let Some(mut pitch_yaw_roll) = transforms.pitch_yaw_roll(self.transform) else {
            return;
        };
        let limit = HALF_PI - PITCH_MARGIN;
        let clamped = utils::clamp(pitch_yaw_roll.x, -limit, limit);
        if clamped != pitch_yaw_roll.x {
            pitch_yaw_roll.x = clamped;
            transforms.set_pitch_yaw_roll(self.transform, pitch_yaw_roll);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use crate::input::GuiCapture;
    use approx::assert_relative_eq;

    fn camera_at(position: Vec3) -> (TransformGraph, Camera) {
        let mut transforms = TransformGraph::new();
        let camera = Camera::new(&mut transforms, position, 16.0 / 9.0, &CameraSettings::default());
        (transforms, camera)
    }

    #[test]
    fn test_view_places_origin_in_front_of_camera() {
        let (_, camera) = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let origin = camera.view().transform_point(&Point3::origin());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_w_moves_forward_and_shift_speeds_up() {
        let (mut transforms, mut camera) = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut input = InputState::new();
        input.set_key(KeyCode::W, true);

        camera.update(1.0, &input, &mut transforms);
        assert_relative_eq!(transforms.position(camera.transform()).unwrap(), Vec3::new(0.0, 0.0, 7.0), epsilon = 1e-5);

        input.set_key(KeyCode::LeftShift, true);
        camera.update(0.1, &input, &mut transforms);
        assert_relative_eq!(transforms.position(camera.transform()).unwrap(), Vec3::new(0.0, 0.0, 5.5), epsilon = 1e-5);
    }

    #[test]
    fn test_vertical_movement_ignores_rotation() {
        let (mut transforms, mut camera) = camera_at(Vec3::zeros());
        transforms.set_pitch_yaw_roll(camera.transform(), Vec3::new(0.5, 0.0, 0.0));
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);

        camera.update(1.0, &input, &mut transforms);
        assert_relative_eq!(transforms.position(camera.transform()).unwrap(), Vec3::new(0.0, 3.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_gui_keyboard_capture_freezes_movement() {
        let (mut transforms, mut camera) = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut input = InputState::new();
        input.set_key(KeyCode::W, true);
        input.set_gui_capture(GuiCapture::KEYBOARD);

        camera.update(1.0, &input, &mut transforms);
        assert_eq!(transforms.position(camera.transform()), Some(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_mouse_drag_yaws_and_pitch_is_clamped() {
        let (mut transforms, mut camera) = camera_at(Vec3::zeros());
        let mut input = InputState::new();
        input.set_button(MouseButton::Left, true);
        input.move_mouse(Vec2::new(100.0, 0.0));

        camera.update(0.0, &input, &mut transforms);
        let angles = transforms.pitch_yaw_roll(camera.transform()).unwrap();
        assert_relative_eq!(angles.y, -0.5, epsilon = 1e-6);

        input.end_frame();
        input.move_mouse(Vec2::new(100.0, -10_000.0));
        camera.update(0.0, &input, &mut transforms);
        let angles = transforms.pitch_yaw_roll(camera.transform()).unwrap();
        assert_relative_eq!(angles.x, HALF_PI - PITCH_MARGIN, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_aspect_keeps_previous_projection() {
        let (_, mut camera) = camera_at(Vec3::zeros());
        let before = camera.projection();
        camera.update_projection_matrix(0.0);
        camera.update_projection_matrix(f32::NAN);
        assert_eq!(camera.projection(), before);

        camera.update_projection_matrix(2.0);
        assert_relative_eq!(camera.aspect(), 2.0);
        assert_ne!(camera.projection(), before);
    }
}
