//! Scene documents
//!
//! A scene serializes to a tree of [`EntityData`] nodes with every component
//! tagged by `"type"`. Loading tolerates missing fields by falling back to each
//! component's defaults. Behaviors are rebuilt through a [`BehaviorRegistry`];
//! names it does not know are skipped with a warning.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::environment::Environment;
use super::scene_graph::Scene;
use super::PersistenceError;
use crate::animation::AnimationController;
use crate::ecs::component::{Component, ComponentSlots};
use crate::ecs::components::{
    AudioSource, BehaviorRegistry, CameraComponent, LightComponent, MeshComponent, MeshData, ParticleData,
    ParticleSystem, PhysicsComponent, PhysicsData, Script, Transform, TransformData,
};
use crate::ecs::entity::EntityId;

/// Current document format
pub const FORMAT_VERSION: u32 = 1;

/// Serialized script: behavior name plus its saved parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptData {
    /// Registry name
    pub name: String,
    /// Enabled flag
    pub enabled: bool,
    /// Behavior parameters
    pub state: Value,
}

impl Default for ScriptData {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            state: Value::Null,
        }
    }
}

/// One component slot, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentData {
    /// Mesh
    Mesh(MeshData),
    /// Physics
    Physics(PhysicsData),
    /// Light
    Light(LightComponent),
    /// Camera
    Camera(CameraComponent),
    /// Particle emitter
    ParticleSystem(ParticleData),
    /// Audio source
    AudioSource(AudioSource),
    /// Script
    Script(ScriptData),
}

/// Serialized entity with its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityData {
    /// Name
    pub name: String,
    /// Persistent id; a fresh one is generated when absent
    pub uuid: Option<Uuid>,
    /// Active flag
    pub active: bool,
    /// Layer
    pub layer: u32,
    /// Local transform
    pub transform: TransformData,
    /// Occupied component slots
    pub components: Vec<ComponentData>,
    /// Animation clips and playback state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationController>,
    /// Children in attach order
    pub children: Vec<EntityData>,
}

impl Default for EntityData {
    fn default() -> Self {
        Self {
            name: "Entity".to_owned(),
            uuid: None,
            active: true,
            layer: 0,
            transform: TransformData::default(),
            components: Vec::new(),
            animation: None,
            children: Vec::new(),
        }
    }
}

/// Serialized scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneData {
    /// Document format
    pub version: u32,
    /// Scene name
    pub name: String,
    /// Ambient light, background and fog
    #[serde(flatten)]
    pub environment: Environment,
    /// Root entities with their subtrees
    pub entities: Vec<EntityData>,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            name: "Scene".to_owned(),
            environment: Environment::default(),
            entities: Vec::new(),
        }
    }
}

impl ComponentSlots {
    fn serialize(&self) -> Vec<ComponentData> {
        let mut components = Vec::new();
        if let Some(mesh) = &self.mesh {
            components.push(ComponentData::Mesh(mesh.serialize()));
        }
        if let Some(physics) = &self.physics {
            components.push(ComponentData::Physics(physics.serialize()));
        }
        if let Some(light) = &self.light {
            components.push(ComponentData::Light(light.clone()));
        }
        if let Some(camera) = &self.camera {
            components.push(ComponentData::Camera(camera.clone()));
        }
        if let Some(particles) = &self.particles {
            components.push(ComponentData::ParticleSystem(particles.serialize()));
        }
        if let Some(audio) = &self.audio {
            components.push(ComponentData::AudioSource(audio.clone()));
        }
        if let Some(script) = &self.script {
            components.push(ComponentData::Script(ScriptData {
                name: script.name().to_owned(),
                enabled: script.enabled,
                state: script.save_state(),
            }));
        }
        components
    }
}

impl Scene {
    /// Snapshot of the whole scene
    pub fn serialize(&self) -> SceneData {
        SceneData {
            version: FORMAT_VERSION,
            name: self.name.clone(),
            environment: self.environment.clone(),
            entities: self.root_entities().iter().filter_map(|id| self.serialize_entity(*id)).collect(),
        }
    }

    /// Snapshot of one entity and its subtree
    pub fn serialize_entity(&self, id: EntityId) -> Option<EntityData> {
        let entity = self.entity(id)?;
        Some(EntityData {
            name: entity.name.clone(),
            uuid: Some(entity.uuid()),
            active: entity.is_active(),
            layer: entity.layer,
            transform: entity.transform.serialize(),
            components: entity.components.serialize(),
            animation: (entity.animation.clip_names().next().is_some()).then(|| entity.animation.clone()),
            children: entity.children().iter().filter_map(|c| self.serialize_entity(*c)).collect(),
        })
    }

    /// Encode as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Rebuild a scene; scripts are dropped since no behaviors are registered
    pub fn from_data(data: &SceneData) -> Result<Self, PersistenceError> {
        Self::from_data_with(data, &BehaviorRegistry::new())
    }

    /// Rebuild a scene, recreating scripts through `registry`
    pub fn from_data_with(data: &SceneData, registry: &BehaviorRegistry) -> Result<Self, PersistenceError> {
        let mut scene = Self::new(data.name.clone());
        scene.load_data(data, registry)?;
        Ok(scene)
    }

    /// Decode JSON produced by [`Scene::to_json`]
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Self::from_json_with(json, &BehaviorRegistry::new())
    }

    /// Decode JSON, recreating scripts through `registry`
    pub fn from_json_with(json: &str, registry: &BehaviorRegistry) -> Result<Self, PersistenceError> {
        let data: SceneData = serde_json::from_str(json)?;
        Self::from_data_with(&data, registry)
    }

    /// Replace this scene's contents with a document, keeping its configured defaults
    pub fn load_data(&mut self, data: &SceneData, registry: &BehaviorRegistry) -> Result<(), PersistenceError> {
        if data.version > FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(data.version));
        }
        check_unique_uuids(&data.entities, &mut HashSet::new())?;

        self.clear();
        self.name.clone_from(&data.name);
        self.environment = data.environment.clone();

        let mut pending_scripts = Vec::new();
        for root in &data.entities {
            self.restore_entity(root, None, &mut pending_scripts);
        }

        // Scripts wake once the whole graph exists so they can look up other entities
        for (id, script) in pending_scripts {
            match registry.create(&script.name, &script.state) {
                Some(behavior) => {
                    self.add_boxed_script(id, behavior);
                    if let Some(restored) = self.get_component_mut::<Script>(id) {
                        restored.enabled = script.enabled;
                    }
                }
                None => log::warn!("Skipping unregistered behavior '{}'", script.name),
            }
        }

        self.refresh_world_matrices();
        log::info!("Loaded scene '{}' with {} entities", self.name, self.entity_count());
        Ok(())
    }

    fn restore_entity(
        &mut self,
        data: &EntityData,
        parent: Option<EntityId>,
        pending_scripts: &mut Vec<(EntityId, ScriptData)>,
    ) -> EntityId {
        let id = self.spawn(data.name.clone(), data.uuid.unwrap_or_else(Uuid::new_v4));
        if let Some(parent) = parent {
            // Both ids were just created and the new one has no children yet
            if let Err(e) = self.add_child(parent, id) {
                log::warn!("Could not attach '{}': {e}", data.name);
            }
        }

        if let Some(entity) = self.entity_mut(id) {
            entity.set_active(data.active);
            entity.layer = data.layer;
            entity.transform = Transform::deserialize(&data.transform);
            if let Some(animation) = &data.animation {
                entity.animation = animation.clone();
            }
        }

        for component in &data.components {
            match component {
                ComponentData::Mesh(mesh) => {
                    let geometry = mesh.geometry.map(|shape| self.geometry(shape, mesh.params));
                    self.insert_component(id, MeshComponent::deserialize(mesh, geometry));
                }
                ComponentData::Physics(physics) => {
                    let mut body = PhysicsComponent::deserialize(physics);
                    if physics.gravity.is_none() {
                        body.apply_scene_defaults(&self.next_attach_context());
                    }
                    self.insert_component(id, body);
                }
                ComponentData::Light(light) => {
                    self.insert_component(id, light.clone());
                }
                ComponentData::Camera(camera) => {
                    self.insert_component(id, camera.clone());
                }
                ComponentData::ParticleSystem(particles) => {
                    let mut system = ParticleSystem::deserialize(particles);
                    system.apply_scene_defaults(&self.next_attach_context());
                    self.insert_component(id, system);
                }
                ComponentData::AudioSource(audio) => {
                    self.insert_component(id, audio.clone());
                }
                ComponentData::Script(script) => pending_scripts.push((id, script.clone())),
            }
        }

        for child in &data.children {
            self.restore_entity(child, Some(id), pending_scripts);
        }
        id
    }
}

fn check_unique_uuids(entities: &[EntityData], seen: &mut HashSet<Uuid>) -> Result<(), PersistenceError> {
    for entity in entities {
        if let Some(uuid) = entity.uuid {
            if !seen.insert(uuid) {
                return Err(PersistenceError::DuplicateUuid(uuid));
            }
        }
        check_unique_uuids(&entity.children, seen)?;
    }
    Ok(())
}
