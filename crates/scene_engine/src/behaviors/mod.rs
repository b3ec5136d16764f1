//! Ready-made behaviors
//!
//! Small scripts covering the common cases: spinning, bouncing, following
//! paths or other entities, player movement, pulsing lights, particle bursts,
//! sound triggers and timers. The gameplay set adds hit points, damage areas,
//! proximity contacts and a named event hub. [`builtin_registry`] knows all of
//! them so saved scenes that use them load back with their parameters.

pub mod combat;
pub mod effects;
pub mod events;
pub mod motion;
pub mod timer;

pub use combat::{CollisionDetector, DamageZone, Health};
pub use effects::{AudioTrigger, LightPulse, ParticleBurst};
pub use events::{EventDispatcher, ListenerId};
pub use motion::{Bouncer, FollowTarget, PathFollower, PlayerController, Rotator};
pub use timer::Countdown;

use crate::ecs::components::{Behavior, BehaviorRegistry};

/// Registry with every built-in behavior
pub fn builtin_registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    registry.register::<Rotator>("Rotator");
    registry.register::<Bouncer>("Bouncer");
    registry.register::<PathFollower>("PathFollower");
    registry.register::<FollowTarget>("FollowTarget");
    registry.register::<PlayerController>("PlayerController");
    registry.register::<ParticleBurst>("ParticleBurst");
    registry.register::<LightPulse>("LightPulse");
    registry.register::<Countdown>("Countdown");
    registry.register::<AudioTrigger>("AudioTrigger");
    registry.register::<Health>("Health");
    registry.register::<DamageZone>("DamageZone");
    registry.register::<CollisionDetector>("CollisionDetector");
    registry.register_with("EventDispatcher", |_| Some(Box::new(EventDispatcher::new()) as Box<dyn Behavior>));
    registry
}
