//! Entity and component model
//!
//! Entities live in the scene's arena and carry one optional slot per
//! component kind. The scene is the only place entities are created, removed
//! or reparented.

pub mod component;
pub mod components;
pub mod entity;

pub use component::{AttachContext, Component, ComponentKind, ComponentSlots};
pub use entity::{Entity, EntityId};
