//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by every subsystem, plus the
//! transform composition shared by `Transform` and the scene's world matrices.

pub use nalgebra::{Matrix4, Rotation3, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Vector helpers not covered by nalgebra's API
pub trait Vec3Ext {
    /// Normalize, yielding the zero vector for zero-length input
    fn normalize_or_zero(&self) -> Vec3;

    /// Build from a `[x, y, z]` array
    fn from_array(values: [f32; 3]) -> Vec3;

    /// Convert to a `[x, y, z]` array
    fn to_array(&self) -> [f32; 3];
}

impl Vec3Ext for Vec3 {
    fn normalize_or_zero(&self) -> Vec3 {
        let length = self.norm();
        if length > 0.0 {
            self / length
        } else {
            Vec3::zeros()
        }
    }

    fn from_array(values: [f32; 3]) -> Vec3 {
        Vec3::new(values[0], values[1], values[2])
    }

    fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Compose a translation, XYZ Euler rotation (radians) and non-uniform scale
/// into a single matrix: `T * Rz * Ry * Rx * S`.
pub fn compose_trs(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    let rotation = Rotation3::from_euler_angles(rotation.x, rotation.y, rotation.z);
    Mat4::new_translation(position) * rotation.to_homogeneous() * Mat4::new_nonuniform_scaling(scale)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

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

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_zero_vector_is_zero() {
        assert_eq!(Vec3::zeros().normalize_or_zero(), Vec3::zeros());
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec3::new(3.0, 0.0, 4.0).normalize_or_zero();
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v, Vec3::new(0.6, 0.0, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn test_vector_operations_are_pure() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);

        assert_eq!(a + b, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(a - b, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(a.dot(&b), 0.0);
        assert_eq!(a.cross(&b), Vec3::new(0.0, 0.0, 1.0));
        // Operands untouched
        assert_eq!(a, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_compose_trs_y_rotation_matches_axis_matrix() {
        let angle = 0.7_f32;
        let matrix = compose_trs(&Vec3::new(1.0, 2.0, 3.0), &Vec3::new(0.0, angle, 0.0), &Vec3::new(1.0, 1.0, 1.0));

        assert_relative_eq!(matrix[(0, 0)], angle.cos(), epsilon = 1e-6);
        assert_relative_eq!(matrix[(0, 2)], angle.sin(), epsilon = 1e-6);
        assert_relative_eq!(matrix[(2, 0)], -angle.sin(), epsilon = 1e-6);
        assert_relative_eq!(matrix[(2, 2)], angle.cos(), epsilon = 1e-6);
        assert_relative_eq!(matrix[(0, 3)], 1.0);
        assert_relative_eq!(matrix[(1, 3)], 2.0);
        assert_relative_eq!(matrix[(2, 3)], 3.0);
    }

    #[test]
    fn test_compose_trs_applies_scale_before_translation() {
        let matrix = compose_trs(&Vec3::new(5.0, 0.0, 0.0), &Vec3::zeros(), &Vec3::new(2.0, 2.0, 2.0));
        let point = matrix.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.x, 7.0);
    }
}
