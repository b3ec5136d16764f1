//! Camera component

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentSlots};
use crate::foundation::math::utils::deg_to_rad;
use crate::foundation::math::Mat4;

const DEGENERATE_EPSILON: f32 = 1e-6;

/// Perspective camera parameters; the view comes from the entity's world matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Width over height
    pub aspect: f32,
    /// Preferred camera for the render surface
    pub is_primary: bool,
    /// Whether the camera is active
    pub enabled: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            is_primary: false,
            enabled: true,
        }
    }
}

impl CameraComponent {
    /// Camera with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary camera with default parameters
    pub fn primary() -> Self {
        Self {
            is_primary: true,
            ..Default::default()
        }
    }

    /// Update aspect ratio from a viewport size; ignores degenerate sizes
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Whether the parameters describe a usable frustum
    pub fn is_valid(&self) -> bool {
        let finite = [self.fov, self.near, self.far, self.aspect].iter().all(|v| v.is_finite());
        finite && self.aspect.abs() > DEGENERATE_EPSILON && (self.far - self.near).abs() > DEGENERATE_EPSILON
    }

    /// Right-handed perspective projection, `None` for a zero aspect or
    /// coincident clip planes
    pub fn projection_matrix(&self) -> Option<Mat4> {
        self.is_valid()
            .then(|| Mat4::new_perspective(self.aspect, deg_to_rad(self.fov), self.near, self.far))
    }
}

impl Component for CameraComponent {
    const KIND: ComponentKind = ComponentKind::Camera;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.camera.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.camera
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = CameraComponent::default();
        assert_eq!(camera.fov, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert!(!camera.is_primary);
    }

    #[test]
    fn test_projection_depends_on_aspect() {
        let mut camera = CameraComponent::new();
        camera.set_viewport(800, 800);
        let projection = camera.projection_matrix().unwrap();

        assert_relative_eq!(projection[(0, 0)], projection[(1, 1)], epsilon = 1e-6);
        assert_relative_eq!(projection[(3, 2)], -1.0);
    }

    #[test]
    fn test_degenerate_viewport_is_ignored() {
        let mut camera = CameraComponent::new();
        camera.set_viewport(0, 600);
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
    }

    #[test]
    fn test_degenerate_frustum_has_no_projection() {
        let planes = CameraComponent {
            near: 1.0,
            far: 1.0,
            ..Default::default()
        };
        assert!(!planes.is_valid());
        assert!(planes.projection_matrix().is_none());

        let flat = CameraComponent {
            aspect: 0.0,
            ..Default::default()
        };
        assert!(flat.projection_matrix().is_none());

        let broken = CameraComponent {
            fov: f32::NAN,
            ..Default::default()
        };
        assert!(broken.projection_matrix().is_none());
    }
}
