//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics built on nalgebra, plus the
//! projection/view matrix constructors the renderer feeds into shader uniforms.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

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

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Extension trait for Mat4 with the matrix constructors used by the renderer
pub trait Mat4Ext {
    /// Create a perspective projection matrix with depth mapped to [0, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection with the origin at the lower-left
    /// corner rather than centered.
    ///
    /// The corner-origin convention is a fixed contract for the 2D/UI camera:
    /// (0, 0) maps to the corner of the viewport so sprite and text layout can
    /// work directly in scaled viewport units.
    fn orthographic_corner(width: f32, height: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view matrix (right-handed, Y-up)
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        debug_assert!(near > 0.0 && far > near, "degenerate clip planes");
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;
        result
    }

    fn orthographic_corner(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        debug_assert!(width > 0.0 && height > 0.0, "degenerate viewport");
        // Maps x in [0, width] and y in [0, height] to [-1, 1], depth to [0, 1].
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / width;
        result[(0, 3)] = -1.0;
        result[(1, 1)] = 2.0 / height;
        result[(1, 3)] = -1.0;
        result[(2, 2)] = 1.0 / (far - near);
        result[(2, 3)] = -near / (far - near);
        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deg_rad_round_trip() {
        assert_relative_eq!(utils::rad_to_deg(utils::deg_to_rad(135.0)), 135.0, epsilon = 1e-4);
    }

    #[test]
    fn look_at_places_eye_at_origin() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::look_at(eye, Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let transformed = view * Vec4::new(eye.x, eye.y, eye.z, 1.0);
        assert_relative_eq!(transformed.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(transformed.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(transformed.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_corner_maps_origin_to_lower_left() {
        let proj = Mat4::orthographic_corner(800.0, 600.0, 0.0, 1.0);
        let corner = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(corner.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, -1.0, epsilon = 1e-5);

        let opposite = proj * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(opposite.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(opposite.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn perspective_maps_near_plane_to_zero_depth() {
        let proj = Mat4::perspective(utils::deg_to_rad(45.0), 16.0 / 9.0, 0.1, 100.0);
        let near_point = proj * Vec4::new(0.0, 0.0, 0.1, 1.0);
        assert_relative_eq!(near_point.z / near_point.w, 0.0, epsilon = 1e-5);
    }
}
