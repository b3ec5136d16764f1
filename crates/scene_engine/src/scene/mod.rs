//! Scene graph
//!
//! The [`Scene`] owns every entity in a slot arena and links them into a
//! forest through id references. It drives the per-frame update, hands a
//! read-only view to the render surface and round-trips through JSON.

pub mod environment;
pub mod persistence;
mod render_view;
mod scene_graph;
pub(crate) mod update;

use thiserror::Error;

use crate::ecs::entity::EntityId;

pub use environment::{Environment, Fog};
pub use persistence::{ComponentData, EntityData, SceneData, ScriptData, FORMAT_VERSION};
pub use render_view::{LightItem, RenderItem};
pub use scene_graph::Scene;

/// Hierarchy errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not refer to a live entity
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// An entity cannot be its own parent
    #[error("An entity cannot be parented to itself")]
    SelfParenting,

    /// The new parent is a descendant of the child
    #[error("Reparenting would create a cycle")]
    HierarchyCycle,
}

/// Scene document errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// JSON encode or decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entities in one document share a persistent id
    #[error("Duplicate entity uuid: {0}")]
    DuplicateUuid(uuid::Uuid),

    /// Document written by a newer format
    #[error("Unsupported scene format version: {0}")]
    UnsupportedVersion(u32),
}
