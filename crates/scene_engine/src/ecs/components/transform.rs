//! Transform component
//!
//! Position, Euler rotation (radians) and scale with a lazily recomputed local
//! matrix. The cached matrix is valid exactly when the transform is clean; every
//! mutator marks it dirty.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{compose_trs, Mat4, Vec3, Vec3Ext};

/// Local transform of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    matrix: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix: Mat4::identity(),
            dirty: true,
        }
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform at a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.dirty = true;
        self
    }

    /// Builder pattern: set rotation (radians)
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self.dirty = true;
        self
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.dirty = true;
        self
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current rotation as XYZ Euler angles in radians
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Current scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace the position
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Replace the rotation (radians)
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Replace the scale
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Add to the position
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vec3::new(dx, dy, dz);
        self.dirty = true;
    }

    /// Add to the rotation (radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vec3::new(dx, dy, dz);
        self.dirty = true;
    }

    /// Overwrite position, rotation and scale in one step
    pub fn set_trs(&mut self, position: Vec3, rotation: Vec3, scale: Vec3) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.dirty = true;
    }

    /// Whether the cached matrix is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cached local matrix, if it is current
    pub fn cached_matrix(&self) -> Option<&Mat4> {
        if self.dirty {
            None
        } else {
            Some(&self.matrix)
        }
    }

    /// Local matrix `T * R * S`, recomputed only when dirty
    pub fn compute_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.matrix = compose_trs(&self.position, &self.rotation, &self.scale);
            self.dirty = false;
        }
        self.matrix
    }

    /// Persistable snapshot
    pub fn serialize(&self) -> TransformData {
        TransformData {
            position: self.position.to_array(),
            rotation: self.rotation.to_array(),
            scale: self.scale.to_array(),
        }
    }

    /// Rebuild from a persisted snapshot
    pub fn deserialize(data: &TransformData) -> Self {
        Self::default()
            .with_position(Vec3::from_array(data.position))
            .with_rotation(Vec3::from_array(data.rotation))
            .with_scale(Vec3::from_array(data.scale))
    }
}

/// Serialized form of a [`Transform`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformData {
    /// Position
    pub position: [f32; 3],
    /// Rotation, radians
    pub rotation: [f32; 3],
    /// Scale
    pub scale: [f32; 3],
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::constants::PI;

    #[test]
    fn test_transform_identity() {
        let mut transform = Transform::identity();

        assert_eq!(transform.position(), Vec3::zeros());
        assert_eq!(transform.scale(), Vec3::new(1.0, 1.0, 1.0));
        assert!(transform.is_dirty());
        assert_eq!(transform.compute_matrix(), Mat4::identity());
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_every_mutator_marks_dirty() {
        let mutators: [fn(&mut Transform); 5] = [
            |t| t.set_position(1.0, 2.0, 3.0),
            |t| t.set_rotation(0.1, 0.2, 0.3),
            |t| t.set_scale(2.0, 2.0, 2.0),
            |t| t.translate(1.0, 0.0, 0.0),
            |t| t.rotate(0.0, 1.0, 0.0),
        ];

        for mutate in mutators {
            let mut transform = Transform::identity();
            transform.compute_matrix();
            assert!(transform.cached_matrix().is_some());

            mutate(&mut transform);
            assert!(transform.is_dirty());
            assert!(transform.cached_matrix().is_none());
        }
    }

    #[test]
    fn test_compute_matrix_is_idempotent_when_clean() {
        let mut transform = Transform::identity();
        transform.set_position(4.0, 5.0, 6.0);

        let first = transform.compute_matrix();
        let cached = *transform.cached_matrix().unwrap();
        let second = transform.compute_matrix();

        assert_eq!(first, cached);
        assert_eq!(first, second);
    }

    #[test]
    fn test_translate_and_rotate_accumulate() {
        let mut transform = Transform::identity();
        transform.set_position(1.0, 1.0, 1.0);
        transform.translate(1.0, -2.0, 0.5);
        transform.rotate(0.0, 0.5, 0.0);
        transform.rotate(0.0, 0.25, 0.0);

        assert_eq!(transform.position(), Vec3::new(2.0, -1.0, 1.5));
        assert_relative_eq!(transform.rotation().y, 0.75);
    }

    #[test]
    fn test_matrix_uses_full_three_axis_rotation() {
        let mut transform = Transform::identity();
        transform.set_rotation(PI / 2.0, 0.0, 0.0);
        let matrix = transform.compute_matrix();

        // +Y rotated 90 degrees about X lands on +Z
        let rotated = matrix.transform_vector(&Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_serialize_round_trip_preserves_fields() {
        let transform = Transform::identity()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(2.0, 1.0, 0.5));

        let restored = Transform::deserialize(&transform.serialize());
        assert_eq!(restored.position(), transform.position());
        assert_eq!(restored.scale(), transform.scale());
        assert!(restored.is_dirty());
    }
}
