//! Behaviors that move their entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::components::{Behavior, PhysicsComponent, ScriptContext};
use crate::foundation::math::{Vec3, Vec3Ext};
use crate::input::{KeyCode, MouseButton};

fn state_of(behavior: &impl Serialize) -> Value {
    serde_json::to_value(behavior).unwrap_or(Value::Null)
}

/// Constant angular velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotator {
    /// Radians per second around each axis
    pub speed: Vec3,
}

impl Default for Rotator {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 0.0))
    }
}

impl Rotator {
    /// Rotate at `speed` radians per second
    pub const fn new(speed: Vec3) -> Self {
        Self { speed }
    }
}

impl Behavior for Rotator {
    fn name(&self) -> &str {
        "Rotator"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let step = self.speed * ctx.delta_time;
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(step.x, step.y, step.z);
        }
    }

    fn save_state(&self) -> Value {
        state_of(self)
    }
}

/// Falls under gravity and respawns above the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bouncer {
    /// Height the entity is moved back to
    pub respawn_height: f32,
    /// Height below which it respawns
    pub floor: f32,
    /// Restitution set on the physics component at start
    pub bounciness: f32,
}

impl Default for Bouncer {
    fn default() -> Self {
        Self {
            respawn_height: 5.0,
            floor: -10.0,
            bounciness: 0.8,
        }
    }
}

impl Behavior for Bouncer {
    fn name(&self) -> &str {
        "Bouncer"
    }

    fn on_start(&mut self, ctx: &mut ScriptContext<'_>) {
        if let Some(physics) = ctx.component_mut::<PhysicsComponent>() {
            physics.set_mass(1.0);
            physics.use_gravity = true;
            physics.bounciness = self.bounciness;
        }
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let Some(entity) = ctx.this_mut() else {
            return;
        };
        let position = entity.transform.position();
        if position.y >= self.floor {
            return;
        }

        entity.transform.set_position(position.x, self.respawn_height, position.z);
        if let Some(physics) = entity.get_component_mut::<PhysicsComponent>() {
            physics.stop();
        }
        log::trace!("'{}' respawned at height {}", entity.name, self.respawn_height);
    }

    fn save_state(&self) -> Value {
        state_of(self)
    }
}

/// Loops along a polyline of waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFollower {
    /// Points visited in order
    pub waypoints: Vec<Vec3>,
    /// Segments per second
    pub speed: f32,
    progress: f32,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            speed: 5.0,
            progress: 0.0,
        }
    }
}

impl PathFollower {
    /// Follow `waypoints` at `speed` segments per second
    pub const fn new(waypoints: Vec<Vec3>, speed: f32) -> Self {
        Self {
            waypoints,
            speed,
            progress: 0.0,
        }
    }

    /// Append a waypoint
    pub fn add_waypoint(&mut self, point: Vec3) {
        self.waypoints.push(point);
    }

    /// Position on the path after `progress` segments
    pub fn sample(&self, progress: f32) -> Option<Vec3> {
        if self.waypoints.len() < 2 {
            return None;
        }
        let segments = self.waypoints.len() - 1;
        let segment = (progress.max(0.0).floor() as usize) % segments;
        let t = progress.max(0.0).fract();

        let from = self.waypoints[segment];
        let to = self.waypoints[segment + 1];
        Some(from + (to - from) * t)
    }
}

impl Behavior for PathFollower {
    fn name(&self) -> &str {
        "PathFollower"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        self.progress += ctx.delta_time * self.speed;
        let Some(point) = self.sample(self.progress) else {
            return;
        };
        if let Some(transform) = ctx.transform_mut() {
            transform.set_position(point.x, point.y, point.z);
        }
    }

    fn save_state(&self) -> Value {
        state_of(self)
    }
}

/// Moves toward a named entity until within range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowTarget {
    /// Name of the entity to follow
    pub target: String,
    /// Distance at which it stops approaching
    pub follow_distance: f32,
    /// Units per second
    pub speed: f32,
}

impl Default for FollowTarget {
    fn default() -> Self {
        Self::new("")
    }
}

impl FollowTarget {
    /// Follow the entity called `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            follow_distance: 3.0,
            speed: 5.0,
        }
    }
}

impl Behavior for FollowTarget {
    fn name(&self) -> &str {
        "FollowTarget"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let Some(target) = ctx.scene.find_by_name(&self.target).and_then(|id| ctx.scene.entity(id)) else {
            return;
        };
        let goal = target.transform.position();
        let delta_time = ctx.delta_time;
        let Some(transform) = ctx.transform_mut() else {
            return;
        };

        let direction = goal - transform.position();
        if direction.norm() > self.follow_distance {
            let step = direction.normalize_or_zero() * self.speed * delta_time;
            transform.translate(step.x, step.y, step.z);
        }
    }

    fn save_state(&self) -> Value {
        state_of(self)
    }
}

/// WASD movement and drag-to-look from the input snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerController {
    /// Units per second
    pub speed: f32,
    /// Radians per pointer unit per second
    pub rotation_speed: f32,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            speed: 10.0,
            rotation_speed: 2.0,
        }
    }
}

impl Behavior for PlayerController {
    fn name(&self) -> &str {
        "PlayerController"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let input = ctx.input;
        let direction = Vec3::new(input.axis(KeyCode::A, KeyCode::D), 0.0, input.axis(KeyCode::W, KeyCode::S));
        let movement = direction.normalize_or_zero() * self.speed * ctx.delta_time;
        let look = if input.is_button_down(MouseButton::Left) {
            input.pointer_delta() * self.rotation_speed * ctx.delta_time
        } else {
            crate::foundation::math::Vec2::zeros()
        };

        if let Some(transform) = ctx.transform_mut() {
            transform.translate(movement.x, movement.y, movement.z);
            transform.rotate(look.y, look.x, 0.0);
        }
    }

    fn save_state(&self) -> Value {
        state_of(self)
    }
}
