//! Math utilities and types
//!
//! Provides the nalgebra aliases used across the engine plus the rotation
//! conventions of the scene graph.
//!
//! # Conventions
//!
//! - Right-handed, Y-up, forward is -Z.
//! - Rotations are stored as pitch (about X), yaw (about Y) and roll (about Z)
//!   in radians. The orientation they describe is `Ry(yaw) * Rx(pitch) * Rz(roll)`.
//! - Local matrices are `T * R * S`: scale first, then rotate, then translate.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Build the orientation described by a pitch/yaw/roll triple.
pub fn quat_from_pitch_yaw_roll(pitch_yaw_roll: &Vec3) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), pitch_yaw_roll.y)
        * Quat::from_axis_angle(&Vec3::x_axis(), pitch_yaw_roll.x)
        * Quat::from_axis_angle(&Vec3::z_axis(), pitch_yaw_roll.z)
}

/// Recover pitch/yaw/roll from an orientation.
///
/// Inverse of [`quat_from_pitch_yaw_roll`] for pitch in `[-pi/2, pi/2]`.
/// At the poles roll is folded into yaw.
pub fn pitch_yaw_roll_from_quat(rotation: &Quat) -> Vec3 {
    let m = rotation.to_rotation_matrix().into_inner();
    let sin_pitch = utils::clamp(-m[(1, 2)], -1.0, 1.0);
    let pitch = sin_pitch.asin();

    if sin_pitch.abs() > 0.999_99 {
        // Gimbal lock: only yaw + roll (or yaw - roll) is observable
        let yaw = (-m[(2, 0)]).atan2(m[(0, 0)]);
        return Vec3::new(pitch, yaw, 0.0);
    }

    let yaw = m[(0, 2)].atan2(m[(2, 2)]);
    let roll = m[(1, 0)].atan2(m[(1, 1)]);
    Vec3::new(pitch, yaw, roll)
}

/// Compose a translate-rotate-scale matrix.
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Extract the translation column of an affine matrix.
pub fn matrix_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Extract the per-axis scale of an affine matrix.
pub fn matrix_scale(matrix: &Mat4) -> Vec3 {
    Vec3::new(
        Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude(),
        Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude(),
        Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude(),
    )
}

/// Extract the rotation of an affine matrix by dividing out its scale.
///
/// Degenerate (zero) scale axes yield the identity rotation.
pub fn matrix_rotation(matrix: &Mat4) -> Quat {
    let scale = matrix_scale(matrix);
    if scale.iter().any(|s| *s <= f32::EPSILON) {
        return Quat::identity();
    }

    let rotation_matrix = Mat3::new(
        matrix.m11 / scale.x, matrix.m12 / scale.y, matrix.m13 / scale.z,
        matrix.m21 / scale.x, matrix.m22 / scale.y, matrix.m23 / scale.z,
        matrix.m31 / scale.x, matrix.m32 / scale.y, matrix.m33 / scale.z,
    );
    Quat::from_matrix(&rotation_matrix)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 4
    pub const QUARTER_PI: f32 = PI * 0.25;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_yaw_turns_x_axis_toward_negative_z() {
        let rotation = quat_from_pitch_yaw_roll(&Vec3::new(0.0, constants::HALF_PI, 0.0));
        let rotated = rotation * Vec3::x();
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_positive_pitch_looks_up() {
        let rotation = quat_from_pitch_yaw_roll(&Vec3::new(0.3, 0.0, 0.0));
        let forward = rotation * Vec3::new(0.0, 0.0, -1.0);
        assert!(forward.y > 0.0);
    }

    #[test]
    fn test_pitch_yaw_roll_recovered_from_quaternion() {
        let angles = Vec3::new(0.4, -1.2, 0.7);
        let recovered = pitch_yaw_roll_from_quat(&quat_from_pitch_yaw_roll(&angles));
        assert_relative_eq!(recovered, angles, epsilon = 1e-5);
    }

    #[test]
    fn test_trs_applies_scale_before_rotation_and_translation() {
        let matrix = compose_trs(
            &Vec3::new(10.0, 0.0, 0.0),
            &quat_from_pitch_yaw_roll(&Vec3::new(0.0, constants::HALF_PI, 0.0)),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        let point = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.coords, Vec3::new(10.0, 0.0, -2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_decomposition() {
        let rotation = quat_from_pitch_yaw_roll(&Vec3::new(0.1, 0.2, 0.3));
        let matrix = compose_trs(&Vec3::new(1.0, 2.0, 3.0), &rotation, &Vec3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(matrix_translation(&matrix), Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
        assert_relative_eq!(matrix_scale(&matrix), Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
        assert!(matrix_rotation(&matrix).angle_to(&rotation) < 1e-3);
    }
}
