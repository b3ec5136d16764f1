//! # Scene Engine
//!
//! Real-time scene simulation core: an entity hierarchy with per-kind
//! component slots, point-mass physics, procedural geometry, keyframe
//! animation, particles and scripted behaviors, stepped by a frame driver.
//!
//! ## Features
//!
//! - **Scene graph**: arena of entities linked by id, world matrices refreshed each tick
//! - **Components**: mesh, physics, light, camera, particles, audio and script slots
//! - **Behaviors**: lifecycle hooks with explicit scene and input context
//! - **Persistence**: JSON scene documents with defaults for missing fields
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let scene = engine.scene_mut();
//!         let cube = scene.create_entity("cube");
//!         scene.set_mesh_geometry(cube, GeometryType::Box, GeometryParams::default());
//!         scene.add_script(cube, Rotator::default());
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut app = MyApp;
//!     Engine::run(config, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod behaviors;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod geometry;
pub mod input;
pub mod scene;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{AnimationClip, AnimationController, AnimationCurve, Channel},
        behaviors::{
            builtin_registry, AudioTrigger, Bouncer, CollisionDetector, Countdown, DamageZone, EventDispatcher,
            FollowTarget, Health, LightPulse, ParticleBurst, PathFollower, PlayerController, Rotator,
        },
        config::{Config, EngineConfig, TimestepMode},
        ecs::components::{
            AudioSource, Behavior, BehaviorRegistry, CameraComponent, LightComponent, LightType, Material,
            MeshComponent, ParticleSystem, PhysicsComponent, Script, ScriptContext, Transform,
        },
        ecs::{Component, Entity, EntityId},
        foundation::math::{Mat4, Vec3, Vec3Ext},
        geometry::{Geometry, GeometryParams, GeometryType},
        input::{InputSnapshot, InputState, KeyCode, MouseButton},
        scene::{Environment, Fog, RenderItem, Scene, SceneError},
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
