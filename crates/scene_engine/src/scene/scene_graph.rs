//! Scene: entity arena, hierarchy and lookup indices
//!
//! The scene is the single owner of every entity. Roots, lights and cameras
//! are kept as id lists that are updated on every create, remove, reparent and
//! component change, so they never refer to a missing entity.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use slotmap::SlotMap;
use uuid::Uuid;

use super::environment::Environment;
use super::SceneError;
use crate::config::EngineConfig;
use crate::ecs::component::{AttachContext, Component};
use crate::ecs::components::{Behavior, CameraComponent, LightComponent, MeshComponent, Script};
use crate::ecs::entity::{Entity, EntityId};
use crate::foundation::math::Vec3;
use crate::geometry::{Geometry, GeometryCache, GeometryParams, GeometryType};
use crate::input::InputSnapshot;

/// The simulated world
#[derive(Debug)]
pub struct Scene {
    /// Scene name
    pub name: String,
    pub(super) entities: SlotMap<EntityId, Entity>,
    pub(super) order: Vec<EntityId>,
    pub(super) roots: Vec<EntityId>,
    lights: Vec<EntityId>,
    cameras: Vec<EntityId>,
    /// Ambient light, clear colour and fog
    pub environment: Environment,
    geometry: GeometryCache,
    defaults: AttachContext,
    attach_count: u64,
    pub(super) elapsed: f32,
    pub(super) frame: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl Scene {
    /// Empty scene with built-in defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: SlotMap::with_key(),
            order: Vec::new(),
            roots: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            environment: Environment::default(),
            geometry: GeometryCache::new(),
            defaults: AttachContext::default(),
            attach_count: 0,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Empty scene taking component defaults from engine configuration
    pub fn with_config(name: impl Into<String>, config: &EngineConfig) -> Self {
        let mut scene = Self::new(name);
        scene.apply_config(config);
        scene
    }

    /// Take gravity and the particle seed for new components from `config`
    pub fn apply_config(&mut self, config: &EngineConfig) {
        self.defaults = AttachContext {
            gravity: config.gravity(),
            particle_seed: config.particle_seed,
        };
    }

    /// Seconds simulated so far
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of completed updates
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create a root entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.spawn(name.into(), Uuid::new_v4())
    }

    pub(super) fn spawn(&mut self, name: String, uuid: Uuid) -> EntityId {
        let id = self.entities.insert_with_key(|id| Entity::new(id, uuid, name));
        self.order.push(id);
        self.roots.push(id);
        log::debug!("Created entity '{}' ({})", self.entities[id].name, uuid);
        id
    }

    /// Remove an entity together with its whole subtree.
    ///
    /// Scripts in the subtree receive `on_destroy` first, while the entities
    /// are still reachable. Returns false if the entity does not exist.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(id) {
            return false;
        }

        for member in self.subtree(id) {
            self.destroy_script(member);
        }

        // A destroy hook may already have removed part of the subtree
        if !self.entities.contains_key(id) {
            return true;
        }

        self.unlink(id);
        let removed: HashSet<EntityId> = self.subtree(id).into_iter().collect();
        for member in &removed {
            self.entities.remove(*member);
        }
        self.order.retain(|e| !removed.contains(e));
        self.roots.retain(|e| !removed.contains(e));
        self.lights.retain(|e| !removed.contains(e));
        self.cameras.retain(|e| !removed.contains(e));

        log::debug!("Removed {} entities", removed.len());
        true
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        for root in self.roots.clone() {
            self.remove_entity(root);
        }
    }

    /// Whether an id refers to a live entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable entity by id
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// First entity with a given name, in creation order
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.entities.get(*id).is_some_and(|entity| entity.name == name))
    }

    /// Entity with a given persistent id
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.entities.get(*id).is_some_and(|entity| entity.uuid() == uuid))
    }

    /// Active entities whose position lies strictly within `radius` of
    /// `center`, in creation order. Positions are local, as set on the transform.
    pub fn entities_within(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.entities
                    .get(*id)
                    .is_some_and(|entity| (entity.transform.position() - center).norm() < radius)
            })
            .filter(|id| self.is_active_in_hierarchy(*id))
            .collect()
    }

    /// All entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(move |id| self.entities.get(*id))
    }

    /// All entity ids in creation order
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities without a parent, in insertion order
    pub fn root_entities(&self) -> &[EntityId] {
        &self.roots
    }

    /// Entities carrying a light
    pub fn lights(&self) -> &[EntityId] {
        &self.lights
    }

    /// Entities carrying a camera
    pub fn cameras(&self) -> &[EntityId] {
        &self.cameras
    }

    /// First camera flagged primary, else the first camera
    pub fn primary_camera(&self) -> Option<EntityId> {
        self.cameras
            .iter()
            .copied()
            .find(|id| {
                self.get_component::<CameraComponent>(*id)
                    .is_some_and(|camera| camera.is_primary)
            })
            .or_else(|| self.cameras.first().copied())
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Attach `child` under `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child {
            return Err(SceneError::SelfParenting);
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneError::HierarchyCycle);
        }
        if self.entities[child].parent == Some(parent) {
            return Ok(());
        }

        self.unlink(child);
        self.entities[child].parent = Some(parent);
        self.entities[parent].children.push(child);
        log::debug!(
            "Reparented '{}' under '{}'",
            self.entities[child].name,
            self.entities[parent].name
        );
        Ok(())
    }

    /// Make an entity a root again
    pub fn detach(&mut self, child: EntityId) -> Result<(), SceneError> {
        self.require(child)?;
        if self.entities[child].parent.is_some() {
            self.unlink(child);
            self.roots.push(child);
        }
        Ok(())
    }

    /// Children of an entity; empty for unknown ids
    pub fn children_of(&self, id: EntityId) -> &[EntityId] {
        self.entities
            .get(id)
            .map(|entity| entity.children.as_slice())
            .unwrap_or_default()
    }

    /// Parent of an entity
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(Entity::parent)
    }

    /// Walk from an entity's parent up to its root
    pub fn ancestors(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::successors(self.parent_of(id), move |current| self.parent_of(*current))
    }

    /// Whether the entity and all its ancestors are active
    pub fn is_active_in_hierarchy(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_active)
            && self
                .ancestors(id)
                .all(|ancestor| self.entities.get(ancestor).is_some_and(Entity::is_active))
    }

    /// The entity followed by all descendants, depth-first, parent before child
    pub fn subtree(&self, id: EntityId) -> Vec<EntityId> {
        let mut visited = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entity) = self.entities.get(current) {
                visited.push(current);
                stack.extend(entity.children.iter().rev());
            }
        }
        visited
    }

    /// Drop the link to the current parent, or the root entry
    fn unlink(&mut self, id: EntityId) {
        match self.entities[id].parent.take() {
            Some(parent) => {
                if let Some(parent) = self.entities.get_mut(parent) {
                    if let Some(index) = parent.children.iter().position(|c| *c == id) {
                        parent.children.remove(index);
                    }
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    fn require(&self, id: EntityId) -> Result<(), SceneError> {
        if self.entities.contains_key(id) {
            Ok(())
        } else {
            Err(SceneError::EntityNotFound(id))
        }
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach a default-constructed component, replacing any in the slot.
    ///
    /// Scene defaults such as gravity and the particle seed are applied.
    pub fn add_component<T: Component + Default>(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        let mut component = T::default();
        component.apply_scene_defaults(&self.next_attach_context());
        self.insert_component(id, component)
    }

    /// Attach a component value, replacing any in the slot.
    ///
    /// A [`Script`] goes through [`Scene::add_script`]'s lifecycle: the old
    /// script is destroyed and the new one woken.
    pub fn insert_component<T: Component>(&mut self, id: EntityId, component: T) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        let mut pending = Some(component);
        if let Some(script) = (&mut pending as &mut dyn Any)
            .downcast_mut::<Option<Script>>()
            .and_then(Option::take)
        {
            self.attach_script(id, script);
            return self.get_component_mut::<T>(id);
        }
        let component = pending?;

        let entity = self.entities.get_mut(id)?;
        if entity.replace_component(component).is_some() {
            log::debug!("Replaced {} on '{}'", T::KIND, entity.name);
        } else {
            log::debug!("Attached {} to '{}'", T::KIND, entity.name);
        }
        self.reindex(id);
        self.entities.get_mut(id).and_then(Entity::get_component_mut::<T>)
    }

    /// Detach and return a component
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        let removed = self.entities.get_mut(id)?.take_component::<T>();
        self.reindex(id);
        removed
    }

    /// Component on an entity
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(id).and_then(Entity::get_component::<T>)
    }

    /// Mutable component on an entity
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(id).and_then(Entity::get_component_mut::<T>)
    }

    pub(super) fn next_attach_context(&mut self) -> AttachContext {
        self.attach_count += 1;
        AttachContext {
            gravity: self.defaults.gravity,
            particle_seed: self.defaults.particle_seed.map(|seed| seed.wrapping_add(self.attach_count)),
        }
    }

    /// Keep the light and camera lists in step with an entity's slots
    fn reindex(&mut self, id: EntityId) {
        let (has_light, has_camera) = match self.entities.get(id) {
            Some(entity) => (
                entity.has_component::<LightComponent>(),
                entity.has_component::<CameraComponent>(),
            ),
            None => (false, false),
        };
        sync_index(&mut self.lights, id, has_light);
        sync_index(&mut self.cameras, id, has_camera);
    }

    // ------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------

    /// Attach a behavior, replacing any existing script, and run its `on_awake`
    pub fn add_script(&mut self, id: EntityId, behavior: impl Behavior) -> bool {
        self.add_boxed_script(id, Box::new(behavior))
    }

    /// Attach an already boxed behavior
    pub fn add_boxed_script(&mut self, id: EntityId, behavior: Box<dyn Behavior>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.remove_script(id);

        let script = Script::from_boxed(behavior);
        log::debug!("Attached script '{}' to '{}'", script.name(), self.entities[id].name);
        self.entities[id].replace_component(script);

        self.run_script_hook(id, super::update::Hook::Awake, &InputSnapshot::empty(), 0.0);
        true
    }

    /// Attach a wrapped behavior, keeping its enabled flag
    fn attach_script(&mut self, id: EntityId, mut script: Script) -> bool {
        let enabled = script.enabled;
        let Some(behavior) = script.take_behavior() else {
            return false;
        };
        let attached = self.add_boxed_script(id, behavior);
        if let Some(script) = self.get_component_mut::<Script>(id) {
            script.enabled = enabled;
        }
        attached
    }

    /// Concrete behavior attached to an entity
    pub fn script<B: Behavior>(&self, id: EntityId) -> Option<&B> {
        self.get_component::<Script>(id)?.behavior::<B>()
    }

    /// Mutable concrete behavior attached to an entity.
    ///
    /// A behavior cannot reach itself this way from inside its own hooks.
    pub fn script_mut<B: Behavior>(&mut self, id: EntityId) -> Option<&mut B> {
        self.get_component_mut::<Script>(id)?.behavior_mut::<B>()
    }

    /// Detach the script, running its `on_destroy`
    pub fn remove_script(&mut self, id: EntityId) -> bool {
        self.destroy_script(id)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Shared geometry for a shape
    pub fn geometry(&mut self, geometry_type: GeometryType, params: GeometryParams) -> Arc<Geometry> {
        self.geometry.get_or_generate(geometry_type, params)
    }

    /// Point an entity's mesh at shared geometry, attaching a mesh if needed
    pub fn set_mesh_geometry(
        &mut self,
        id: EntityId,
        geometry_type: GeometryType,
        params: GeometryParams,
    ) -> Option<&mut MeshComponent> {
        if !self.contains(id) {
            return None;
        }
        let geometry = self.geometry(geometry_type, params);
        if !self.entities[id].has_component::<MeshComponent>() {
            self.insert_component(id, MeshComponent::new());
        }
        let mesh = self.get_component_mut::<MeshComponent>(id)?;
        mesh.geometry = Some(geometry);
        Some(mesh)
    }

    /// The geometry cache
    pub const fn geometry_cache(&self) -> &GeometryCache {
        &self.geometry
    }

    /// Release cached geometry no mesh uses any more
    pub fn purge_geometry(&mut self) -> usize {
        self.geometry.purge_unused()
    }
}

fn sync_index(index: &mut Vec<EntityId>, id: EntityId, present: bool) {
    let position = index.iter().position(|e| *e == id);
    match (present, position) {
        (true, None) => index.push(id),
        (false, Some(position)) => {
            index.remove(position);
        }
        _ => {}
    }
}
