//! Math utilities and types
//!
//! Provides the vector and matrix aliases used across the engine, the
//! projection helpers used by cameras, and a couple of pure geometric
//! helpers for planar aiming.

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

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

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
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a right-handed perspective projection with depth mapped to [0, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let ys = 1.0 / (fov_y * 0.5).tan();
        let xs = ys / aspect;
        let zs = far / (near - far);

        let mut result = Mat4::zeros();
        result[(0, 0)] = xs;
        result[(1, 1)] = ys;
        result[(2, 2)] = zs;
        result[(2, 3)] = near * zs;
        result[(3, 2)] = -1.0;
        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}

/// Signed angle in radians between unit vectors `x` and `y`.
///
/// The magnitude comes from the clamped dot product; the sign is negative
/// when `reference` points away from `x × y`.
pub fn oriented_angle(x: &Vec3, y: &Vec3, reference: &Vec3) -> f32 {
    let angle = x.dot(y).clamp(-1.0, 1.0).acos();
    if reference.dot(&x.cross(y)) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Unproject a clip-space point onto the horizontal plane `y = plane_y`.
///
/// Solves for the clip depth whose world-space image lies on the plane and
/// returns that world point with its `y` reported as zero, which is what the
/// planar aiming code consumes.
pub fn world_coordinates(
    projection: &Mat4,
    view: &Mat4,
    clip_x: f32,
    clip_y: f32,
    plane_y: f32,
) -> Option<Vec3> {
    let m = (projection * view).try_inverse()?;

    let w_base = m[(3, 0)] * clip_x + m[(3, 1)] * clip_y + m[(3, 3)];
    let y_base = m[(1, 0)] * clip_x + m[(1, 1)] * clip_y + m[(1, 3)];
    let denom = m[(3, 2)] * plane_y - m[(1, 2)];
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let depth = (y_base - plane_y * w_base) / denom;

    let s = 1.0 / (w_base + m[(3, 2)] * depth);
    let clip = Vec4::new(clip_x * s, clip_y * s, depth * s, s);
    let world = m * clip;

    Some(Vec3::new(world.x, 0.0, world.z))
}
