//! Mesh component and surface material

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentSlots};
use crate::foundation::math::{Vec3, Vec4};
use crate::geometry::{Geometry, GeometryParams, GeometryType};

/// Surface parameters read by the render surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    /// Display name
    pub name: String,
    /// Base colour, RGBA in `[0, 1]`
    pub color: Vec4,
    /// Metalness in `[0, 1]`
    pub metalness: f32,
    /// Roughness in `[0, 1]`
    pub roughness: f32,
    /// Emissive colour, RGB
    pub emissive: Vec3,
    /// Emissive multiplier
    pub emissive_intensity: f32,
    /// Whether blending is needed
    pub transparent: bool,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_owned(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            metalness: 0.5,
            roughness: 0.5,
            emissive: Vec3::zeros(),
            emissive_intensity: 0.0,
            transparent: false,
            opacity: 1.0,
        }
    }
}

impl Material {
    /// Named material with default parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set colour
    pub fn with_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.color = Vec4::new(r, g, b, a);
        self
    }

    /// Builder pattern: set metalness and roughness
    pub fn with_pbr(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: set emission
    pub fn with_emissive(mut self, emissive: Vec3, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity.max(0.0);
        self
    }

    /// Set opacity; anything below one marks the material transparent
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
    }
}

/// Renderable mesh: shared geometry plus a material
#[derive(Debug, Clone)]
pub struct MeshComponent {
    /// Shared, immutable geometry
    pub geometry: Option<Arc<Geometry>>,
    /// Surface material
    pub material: Material,
    /// Casts shadows
    pub cast_shadow: bool,
    /// Receives shadows
    pub receive_shadow: bool,
    /// Drawn at all
    pub visible: bool,
    /// Whether the component is active
    pub enabled: bool,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self {
            geometry: None,
            material: Material::default(),
            cast_shadow: true,
            receive_shadow: true,
            visible: true,
            enabled: true,
        }
    }
}

impl MeshComponent {
    /// Mesh with no geometry yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh around an existing geometry handle
    pub fn with_geometry(geometry: Arc<Geometry>) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    /// Builder pattern: set material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Generate and assign a fresh geometry with default parameters.
    ///
    /// Prefer [`crate::scene::Scene::set_mesh_geometry`] to share buffers.
    pub fn set_geometry(&mut self, geometry_type: GeometryType) {
        self.geometry = Some(Arc::new(Geometry::with_defaults(geometry_type)));
    }

    /// Set the material colour
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.material.color = Vec4::new(r, g, b, a);
    }

    /// Whether there is anything to draw
    pub fn is_drawable(&self) -> bool {
        self.enabled && self.visible && self.geometry.as_ref().is_some_and(|g| !g.is_empty())
    }

    /// Persistable snapshot
    pub fn serialize(&self) -> MeshData {
        MeshData {
            enabled: self.enabled,
            geometry: self.geometry.as_ref().map(|g| g.geometry_type()),
            params: self.geometry.as_ref().map(|g| *g.params()).unwrap_or_default(),
            material: self.material.clone(),
            cast_shadow: self.cast_shadow,
            receive_shadow: self.receive_shadow,
            visible: self.visible,
        }
    }

    /// Rebuild from a persisted snapshot, with geometry supplied by the caller
    pub fn deserialize(data: &MeshData, geometry: Option<Arc<Geometry>>) -> Self {
        Self {
            geometry,
            material: data.material.clone(),
            cast_shadow: data.cast_shadow,
            receive_shadow: data.receive_shadow,
            visible: data.visible,
            enabled: data.enabled,
        }
    }
}

impl Component for MeshComponent {
    const KIND: ComponentKind = ComponentKind::Mesh;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.mesh.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.mesh
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Serialized form of a [`MeshComponent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshData {
    /// Enabled flag
    pub enabled: bool,
    /// Shape tag, if any geometry was assigned
    pub geometry: Option<GeometryType>,
    /// Shape parameters
    pub params: GeometryParams,
    /// Material
    pub material: Material,
    /// Casts shadows
    pub cast_shadow: bool,
    /// Receives shadows
    pub receive_shadow: bool,
    /// Visible flag
    pub visible: bool,
}

impl Default for MeshData {
    fn default() -> Self {
        MeshComponent::default().serialize()
    }
}
