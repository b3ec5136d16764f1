//! Scene-wide lighting and atmosphere settings

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Linear distance fog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fog {
    /// Whether fog is applied
    pub enabled: bool,
    /// Distance where fog starts
    pub near: f32,
    /// Distance where fog is opaque
    pub far: f32,
    /// Fog colour, RGB
    pub color: Vec3,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            enabled: false,
            near: 0.0,
            far: 100.0,
            color: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Fog {
    /// Fog blend factor in `[0, 1]` at a view distance; zero when disabled
    pub fn factor(&self, distance: f32) -> f32 {
        if !self.enabled || self.far <= self.near {
            return 0.0;
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Ambient light, clear colour and fog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    /// Ambient light colour, RGB
    pub ambient_light: Vec3,
    /// Clear colour, RGB
    pub background_color: Vec3,
    /// Distance fog
    pub fog: Fog,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient_light: Vec3::new(0.5, 0.5, 0.5),
            background_color: Vec3::new(0.1, 0.1, 0.1),
            fog: Fog::default(),
        }
    }
}
