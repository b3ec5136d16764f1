//! Lighting component
//!
//! Pure data. Position and direction come from the owning entity's world
//! matrix, so the light itself only carries photometric parameters.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentSlots};
use crate::foundation::math::constants::PI;
use crate::foundation::math::Vec3;

/// Types of lights supported by the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    /// Directional light (like sunlight) with parallel rays
    Directional,
    /// Point light that radiates in all directions from a position
    Point,
    /// Spot light that creates a cone of light from a position
    Spot,
}

/// Light source parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightComponent {
    /// The type of light
    pub light_type: LightType,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Maximum reach for point and spot lights
    pub range: f32,
    /// Spot cone angle in radians
    pub angle: f32,
    /// Spot edge softness in `[0, 1]`
    pub penumbra: f32,
    /// Distance falloff exponent
    pub decay: f32,
    /// Whether this light should cast shadows
    pub cast_shadow: bool,
    /// Shadow map resolution in texels
    pub shadow_map_size: u32,
    /// Whether the light is currently enabled
    pub enabled: bool,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 100.0,
            angle: PI / 3.0,
            penumbra: 0.0,
            decay: 1.0,
            cast_shadow: true,
            shadow_map_size: 1024,
            enabled: true,
        }
    }
}

impl LightComponent {
    /// Light of the given type with default parameters
    pub fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            ..Default::default()
        }
    }

    /// Directional light
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            intensity,
            ..Default::default()
        }
    }

    /// Point light
    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color,
            intensity,
            range,
            ..Default::default()
        }
    }

    /// Spot light with a cone angle in radians
    pub fn spot(color: Vec3, intensity: f32, range: f32, angle: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            color,
            intensity,
            range,
            angle,
            ..Default::default()
        }
    }

    /// Set intensity, clamped to be non-negative
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.max(0.0);
    }
}

impl Component for LightComponent {
    const KIND: ComponentKind = ComponentKind::Light;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.light.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.light
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
