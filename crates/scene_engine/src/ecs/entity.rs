//! Entity record stored in the scene arena

use slotmap::new_key_type;
use uuid::Uuid;

use super::component::{Component, ComponentKind, ComponentSlots};
use super::components::Transform;
use crate::animation::AnimationController;
use crate::foundation::math::{Mat4, Vec3};

new_key_type! {
    /// Stable handle to an entity inside one scene
    pub struct EntityId;
}

/// A named node in the scene graph.
///
/// Entities are created and destroyed only through [`crate::scene::Scene`],
/// which also owns the parent/child links.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    uuid: Uuid,
    /// Display name
    pub name: String,
    active: bool,
    /// Render/query layer
    pub layer: u32,
    /// Local transform
    pub transform: Transform,
    pub(crate) components: ComponentSlots,
    /// Clip playback applied to the transform each tick
    pub animation: AnimationController,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    world_matrix: Mat4,
}

impl Entity {
    pub(crate) fn new(id: EntityId, uuid: Uuid, name: String) -> Self {
        Self {
            id,
            uuid,
            name,
            active: true,
            layer: 0,
            transform: Transform::default(),
            components: ComponentSlots::default(),
            animation: AnimationController::default(),
            parent: None,
            children: Vec::new(),
            world_matrix: Mat4::identity(),
        }
    }

    /// Arena handle
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Persistent identifier, unique across scenes and sessions
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Whether this entity's own update runs
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable this entity and, through it, its subtree
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Component in `T`'s slot
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        T::slot(&self.components)
    }

    /// Mutable component in `T`'s slot
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        T::slot_mut(&mut self.components).as_mut()
    }

    /// Whether `T`'s slot is occupied
    pub fn has_component<T: Component>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Occupied slot kinds
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.components.kinds()
    }

    /// Parent handle, `None` for roots
    pub const fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in attach order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// World matrix from the most recent update
    pub const fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Translation part of the world matrix
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub(crate) fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    /// Store a component, returning whatever occupied the slot
    pub(crate) fn replace_component<T: Component>(&mut self, component: T) -> Option<T> {
        T::slot_mut(&mut self.components).replace(component)
    }

    /// Empty a slot
    pub(crate) fn take_component<T: Component>(&mut self) -> Option<T> {
        T::slot_mut(&mut self.components).take()
    }
}
