//! Per-frame update of the scene graph
//!
//! Roots are visited in insertion order and each subtree depth-first, parent
//! before child. For every active entity the order is fixed: physics, script
//! hooks, particles, animation, then the world matrix. Inactive entities skip
//! their whole subtree.

use nalgebra::Point3;

use super::scene_graph::Scene;
use crate::ecs::components::{Behavior, Script, ScriptContext};
use crate::ecs::entity::EntityId;
use crate::foundation::math::Mat4;
use crate::input::InputSnapshot;

/// Lifecycle hook selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hook {
    Awake,
    Start,
    Update,
    FixedUpdate,
}

impl Scene {
    /// Advance the scene by `delta_time` seconds with no input
    pub fn update(&mut self, delta_time: f32) {
        self.update_with_input(delta_time, &InputSnapshot::empty());
    }

    /// Advance the scene by `delta_time` seconds; scripts see `input`
    pub fn update_with_input(&mut self, delta_time: f32, input: &InputSnapshot) {
        let delta_time = delta_time.max(0.0);
        self.elapsed += delta_time;

        for root in self.roots.clone() {
            self.update_entity(root, Mat4::identity(), delta_time, input);
        }

        self.frame += 1;
        log::trace!("Scene '{}' frame {} ({:.4}s)", self.name, self.frame, delta_time);
    }

    /// Run `on_fixed_update` for every active script, depth-first
    pub fn fixed_update(&mut self, step: f32, input: &InputSnapshot) {
        for root in self.roots.clone() {
            self.fixed_update_entity(root, step, input);
        }
    }

    /// Recompute every world matrix without simulating
    pub fn refresh_world_matrices(&mut self) {
        for root in self.roots.clone() {
            self.refresh_entity(root, Mat4::identity());
        }
    }

    fn update_entity(&mut self, id: EntityId, parent_world: Mat4, delta_time: f32, input: &InputSnapshot) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if !entity.is_active() {
            return;
        }

        if let Some(physics) = entity.components.physics.as_mut() {
            if let Some(displacement) = physics.integrate(delta_time) {
                entity.transform.translate(displacement.x, displacement.y, displacement.z);
            }
        }

        if self.ensure_started(id, input, delta_time) {
            self.run_script_hook(id, Hook::Update, input, delta_time);
        }

        // The script may have removed its own entity
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };

        if let Some(particles) = entity.components.particles.as_mut().filter(|p| p.enabled) {
            let origin = parent_world.transform_point(&Point3::from(entity.transform.position()));
            particles.update(delta_time, origin.coords);
        }

        if let Some(sample) = entity.animation.update(delta_time) {
            entity.transform.set_trs(sample.position, sample.rotation, sample.scale);
        }

        let world = parent_world * entity.transform.compute_matrix();
        entity.set_world_matrix(world);

        for child in entity.children.clone() {
            self.update_entity(child, world, delta_time, input);
        }
    }

    fn fixed_update_entity(&mut self, id: EntityId, step: f32, input: &InputSnapshot) {
        if !self.entities.get(id).is_some_and(|e| e.is_active()) {
            return;
        }

        if self.ensure_started(id, input, step) {
            self.run_script_hook(id, Hook::FixedUpdate, input, step);
        }

        for child in self.children_of(id).to_vec() {
            self.fixed_update_entity(child, step, input);
        }
    }

    fn refresh_entity(&mut self, id: EntityId, parent_world: Mat4) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let world = parent_world * entity.transform.compute_matrix();
        entity.set_world_matrix(world);

        for child in entity.children.clone() {
            self.refresh_entity(child, world);
        }
    }

    /// Run `on_start` once if needed; returns whether the script should run further hooks
    fn ensure_started(&mut self, id: EntityId, input: &InputSnapshot, delta_time: f32) -> bool {
        let Some(script) = self.get_component_mut::<Script>(id) else {
            return false;
        };
        if !script.enabled {
            return false;
        }
        if !script.is_started() {
            script.mark_started();
            self.run_script_hook(id, Hook::Start, input, delta_time);
        }
        self.get_component::<Script>(id).is_some_and(|s| s.enabled)
    }

    /// Invoke one hook with the behavior temporarily moved out of its slot
    pub(crate) fn run_script_hook(&mut self, id: EntityId, hook: Hook, input: &InputSnapshot, delta_time: f32) {
        let Some(mut behavior) = self.get_component_mut::<Script>(id).and_then(Script::take_behavior) else {
            return;
        };

        let elapsed = self.elapsed;
        let mut ctx = ScriptContext {
            scene: self,
            entity: id,
            input,
            delta_time,
            elapsed,
        };
        match hook {
            Hook::Awake => behavior.on_awake(&mut ctx),
            Hook::Start => behavior.on_start(&mut ctx),
            Hook::Update => behavior.on_update(&mut ctx),
            Hook::FixedUpdate => behavior.on_fixed_update(&mut ctx),
        }

        let orphan = match self.get_component_mut::<Script>(id) {
            Some(script) => script.restore_behavior(behavior).err(),
            None => Some(behavior),
        };
        // Removed or replaced from inside its own hook
        if let Some(orphan) = orphan {
            self.call_destroy(id, orphan);
        }
    }

    /// Take the script out of its slot and run `on_destroy`; false if there was none
    pub(crate) fn destroy_script(&mut self, id: EntityId) -> bool {
        let Some(mut script) = self.entities.get_mut(id).and_then(|e| e.take_component::<Script>()) else {
            return false;
        };
        // A script destroying itself mid-hook has no behavior here; the hook runner finishes it
        if let Some(behavior) = script.take_behavior() {
            self.call_destroy(id, behavior);
        }
        true
    }

    fn call_destroy(&mut self, id: EntityId, mut behavior: Box<dyn Behavior>) {
        log::debug!("Destroying script '{}'", behavior.name());
        let input = InputSnapshot::empty();
        let elapsed = self.elapsed;
        let mut ctx = ScriptContext {
            scene: self,
            entity: id,
            input: &input,
            delta_time: 0.0,
            elapsed,
        };
        behavior.on_destroy(&mut ctx);
    }
}
