//! ECS components
//!
//! One module per slot kind, plus the transform every entity owns.

pub mod audio;
pub mod camera;
pub mod lighting;
pub mod mesh;
pub mod particles;
pub mod physics;
pub mod script;
pub mod transform;

pub use audio::AudioSource;
pub use camera::CameraComponent;
pub use lighting::{LightComponent, LightType};
pub use mesh::{Material, MeshComponent, MeshData};
pub use particles::{Particle, ParticleData, ParticleSystem};
pub use physics::{PhysicsComponent, PhysicsData};
pub use script::{AsAny, Behavior, BehaviorRegistry, Script, ScriptContext};
pub use transform::{Transform, TransformData};
