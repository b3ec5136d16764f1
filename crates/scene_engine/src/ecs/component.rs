//! Component trait and per-entity component slots
//!
//! Each entity has exactly one optional slot per component kind. The
//! [`Component`] trait maps a concrete type to its slot at compile time, so
//! lookups are a field access rather than a type-id search.

use std::fmt;

use super::components::{
    AudioSource, CameraComponent, LightComponent, MeshComponent, ParticleSystem, PhysicsComponent, Script,
};
use crate::foundation::math::Vec3;

/// Component kinds an entity can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Renderable mesh and material
    Mesh,
    /// Point-mass physics
    Physics,
    /// Light source
    Light,
    /// Camera
    Camera,
    /// Particle emitter
    ParticleSystem,
    /// Audio emitter
    AudioSource,
    /// Scripted behavior
    Script,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mesh => "Mesh",
            Self::Physics => "Physics",
            Self::Light => "Light",
            Self::Camera => "Camera",
            Self::ParticleSystem => "ParticleSystem",
            Self::AudioSource => "AudioSource",
            Self::Script => "Script",
        };
        f.write_str(name)
    }
}

/// Scene-wide defaults handed to components created through the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachContext {
    /// Gravity for new physics components
    pub gravity: Vec3,
    /// Seed for a new particle system's generator
    pub particle_seed: Option<u64>,
}

impl Default for AttachContext {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            particle_seed: None,
        }
    }
}

/// One optional slot per component kind
#[derive(Debug, Default)]
pub struct ComponentSlots {
    pub(crate) mesh: Option<MeshComponent>,
    pub(crate) physics: Option<PhysicsComponent>,
    pub(crate) light: Option<LightComponent>,
    pub(crate) camera: Option<CameraComponent>,
    pub(crate) particles: Option<ParticleSystem>,
    pub(crate) audio: Option<AudioSource>,
    pub(crate) script: Option<Script>,
}

impl ComponentSlots {
    /// Kinds currently occupied
    pub fn kinds(&self) -> Vec<ComponentKind> {
        [
            (self.mesh.is_some(), ComponentKind::Mesh),
            (self.physics.is_some(), ComponentKind::Physics),
            (self.light.is_some(), ComponentKind::Light),
            (self.camera.is_some(), ComponentKind::Camera),
            (self.particles.is_some(), ComponentKind::ParticleSystem),
            (self.audio.is_some(), ComponentKind::AudioSource),
            (self.script.is_some(), ComponentKind::Script),
        ]
        .into_iter()
        .filter_map(|(present, kind)| present.then_some(kind))
        .collect()
    }
}

/// A type stored in a fixed entity slot
pub trait Component: Sized + 'static {
    /// Slot this type occupies
    const KIND: ComponentKind;

    /// Shared access to this type's slot
    fn slot(slots: &ComponentSlots) -> Option<&Self>;

    /// Exclusive access to this type's slot
    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self>;

    /// Whether the per-frame update should consider this component
    fn is_enabled(&self) -> bool;

    /// Adopt scene-wide defaults when the scene constructs the component
    fn apply_scene_defaults(&mut self, _context: &AttachContext) {}
}
