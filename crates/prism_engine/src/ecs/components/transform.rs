//! Transform component
//!
//! Pure data: world-space position, Euler rotation in degrees, and local
//! scale. Transforms are flat (no parenting); the renderer reads them, the
//! application (or physics) writes them.

use nalgebra::Rotation3;

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Vec3};

/// Flat spatial transform attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World-space position
    pub position: Vec3,
    /// Euler rotation in degrees (applied X, then Y, then Z)
    pub rotation_degrees: Vec3,
    /// Local scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation_degrees: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform with only position set
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    /// Transform with position and uniform scale
    pub fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::new(scale, scale, scale),
            ..Default::default()
        }
    }

    /// Model matrix mapping local space to world space.
    ///
    /// Applies scale, then rotation, then translation.
    pub fn to_matrix(&self) -> Mat4 {
        let rotation = Rotation3::from_euler_angles(
            utils::deg_to_rad(self.rotation_degrees.x),
            utils::deg_to_rad(self.rotation_degrees.y),
            utils::deg_to_rad(self.rotation_degrees.z),
        );
        Mat4::new_translation(&self.position)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn identity_produces_identity_matrix() {
        assert_eq!(TransformComponent::identity().to_matrix(), Mat4::identity());
    }

    #[test]
    fn scale_applies_before_translation() {
        let transform = TransformComponent {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation_degrees: Vec3::zeros(),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let point = transform.to_matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(point.x, 12.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_is_in_degrees() {
        let transform = TransformComponent {
            position: Vec3::zeros(),
            rotation_degrees: Vec3::new(0.0, 0.0, 90.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        let point = transform.to_matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(point.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(point.y, 1.0, epsilon = 1e-5);
    }
}
