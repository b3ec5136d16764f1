//! Physics component: velocity integration under gravity and drag
//!
//! This is a point-mass integrator, not a rigid-body solver. It produces a
//! displacement per step which the scene applies to the entity's transform.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{AttachContext, Component, ComponentKind, ComponentSlots};
use crate::foundation::math::{Vec3, Vec3Ext};

/// Point-mass physics state
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    /// Mass; zero means immovable
    pub mass: f32,

    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Acceleration accumulated since the last step
    pub acceleration: Vec3,

    /// Whether gravity is added every step
    pub use_gravity: bool,

    /// Gravity acceleration
    pub gravity: Vec3,

    /// Friction coefficient, reserved for contact response
    pub friction: f32,

    /// Restitution, reserved for contact response
    pub bounciness: f32,

    /// Fraction of velocity removed every step, in `[0, 1)`
    pub drag: f32,

    /// Exempt from forces and gravity
    pub kinematic: bool,

    /// Whether the integrator runs
    pub enabled: bool,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            use_gravity: true,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            friction: 0.1,
            bounciness: 0.2,
            drag: 0.01,
            kinematic: false,
            enabled: true,
        }
    }
}

impl PhysicsComponent {
    /// Create a physics component with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Builder pattern: set drag
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.set_drag(drag);
        self
    }

    /// Builder pattern: set initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder pattern: set kinematic
    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Builder pattern: set gravity usage
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Set mass, clamped to be non-negative
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
    }

    /// Set drag, clamped into `[0, 1)`
    pub fn set_drag(&mut self, drag: f32) {
        self.drag = drag.clamp(0.0, 1.0 - f32::EPSILON);
    }

    /// Whether the integrator moves this body at all
    pub fn is_movable(&self) -> bool {
        self.enabled && self.mass > 0.0 && !self.kinematic
    }

    /// Accumulate `force / mass` into acceleration. A no-op on immovable bodies.
    pub fn apply_force(&mut self, force: Vec3) {
        if self.mass <= 0.0 || self.kinematic {
            return;
        }
        self.acceleration += force / self.mass;
    }

    /// Add an instantaneous velocity change scaled by inverse mass
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.mass <= 0.0 || self.kinematic {
            return;
        }
        self.velocity += impulse / self.mass;
    }

    /// Run one integration step and return the displacement to apply.
    ///
    /// Returns `None` for immovable bodies; their state is left untouched.
    pub fn integrate(&mut self, delta_time: f32) -> Option<Vec3> {
        if !self.is_movable() {
            return None;
        }

        if self.use_gravity {
            self.acceleration += self.gravity;
        }
        self.velocity += self.acceleration * delta_time;
        self.velocity *= 1.0 - self.drag;

        let displacement = self.velocity * delta_time;
        self.acceleration = Vec3::zeros();
        Some(displacement)
    }

    /// Zero velocity and pending acceleration
    pub fn stop(&mut self) {
        self.velocity = Vec3::zeros();
        self.acceleration = Vec3::zeros();
    }

    /// Persistable snapshot
    pub fn serialize(&self) -> PhysicsData {
        PhysicsData {
            enabled: self.enabled,
            mass: self.mass,
            velocity: self.velocity.to_array(),
            use_gravity: self.use_gravity,
            gravity: Some(self.gravity.to_array()),
            friction: self.friction,
            bounciness: self.bounciness,
            drag: self.drag,
            kinematic: self.kinematic,
        }
    }

    /// Rebuild from a persisted snapshot
    pub fn deserialize(data: &PhysicsData) -> Self {
        let mut physics = Self {
            velocity: Vec3::from_array(data.velocity),
            use_gravity: data.use_gravity,
            friction: data.friction,
            bounciness: data.bounciness,
            kinematic: data.kinematic,
            enabled: data.enabled,
            ..Self::default()
        };
        if let Some(gravity) = data.gravity {
            physics.gravity = Vec3::from_array(gravity);
        }
        physics.set_mass(data.mass);
        physics.set_drag(data.drag);
        physics
    }
}

impl Component for PhysicsComponent {
    const KIND: ComponentKind = ComponentKind::Physics;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.physics.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.physics
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply_scene_defaults(&mut self, context: &AttachContext) {
        self.gravity = context.gravity;
    }
}

/// Serialized form of a [`PhysicsComponent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsData {
    /// Enabled flag
    pub enabled: bool,
    /// Mass
    pub mass: f32,
    /// Velocity
    pub velocity: [f32; 3],
    /// Gravity flag
    pub use_gravity: bool,
    /// Gravity vector; absent means the scene default
    pub gravity: Option<[f32; 3]>,
    /// Friction
    pub friction: f32,
    /// Bounciness
    pub bounciness: f32,
    /// Drag
    pub drag: f32,
    /// Kinematic flag
    #[serde(rename = "isKinematic")]
    pub kinematic: bool,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            gravity: None,
            ..PhysicsComponent::default().serialize()
        }
    }
}
