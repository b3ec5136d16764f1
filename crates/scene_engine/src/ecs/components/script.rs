//! Script component and the behavior interface
//!
//! A [`Behavior`] receives lifecycle hooks with an explicit [`ScriptContext`]
//! that grants mutable access to the scene and read-only access to the tick's
//! input. There is no global engine to reach into.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ecs::component::{Component, ComponentKind, ComponentSlots};
use crate::ecs::components::Transform;
use crate::ecs::entity::{Entity, EntityId};
use crate::input::InputSnapshot;
use crate::scene::Scene;

/// Everything a hook may touch
pub struct ScriptContext<'a> {
    /// The scene being updated
    pub scene: &'a mut Scene,
    /// Entity owning the script
    pub entity: EntityId,
    /// Input frozen for this tick
    pub input: &'a InputSnapshot,
    /// Step length in seconds
    pub delta_time: f32,
    /// Scene time in seconds
    pub elapsed: f32,
}

impl ScriptContext<'_> {
    /// The owning entity, if it still exists
    pub fn this(&self) -> Option<&Entity> {
        self.scene.entity(self.entity)
    }

    /// Mutable owning entity, if it still exists
    pub fn this_mut(&mut self) -> Option<&mut Entity> {
        self.scene.entity_mut(self.entity)
    }

    /// The owning entity's transform
    pub fn transform(&self) -> Option<&Transform> {
        self.this().map(|entity| &entity.transform)
    }

    /// Mutable transform of the owning entity
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.this_mut().map(|entity| &mut entity.transform)
    }

    /// A component on the owning entity
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.this().and_then(Entity::get_component::<T>)
    }

    /// A mutable component on the owning entity
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.this_mut().and_then(Entity::get_component_mut::<T>)
    }
}

/// Downcast support for behaviors, implemented for every `'static` type
pub trait AsAny: Any {
    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Lifecycle hooks of a scripted behavior. Every hook defaults to a no-op.
pub trait Behavior: AsAny {
    /// Identifier used for logging and persistence
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when attached
    fn on_awake(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called once before the first update
    fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called every tick
    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called once per fixed step
    fn on_fixed_update(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called when the script or its entity goes away
    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Parameters to persist with the scene
    fn save_state(&self) -> Value {
        Value::Null
    }
}

/// Script slot content: one owned behavior plus lifecycle bookkeeping
pub struct Script {
    behavior: Option<Box<dyn Behavior>>,
    name: String,
    started: bool,
    /// Whether hooks run
    pub enabled: bool,
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("name", &self.name)
            .field("started", &self.started)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Script {
    /// Wrap a behavior
    pub fn new(behavior: impl Behavior) -> Self {
        Self::from_boxed(Box::new(behavior))
    }

    /// Wrap an already boxed behavior
    pub fn from_boxed(behavior: Box<dyn Behavior>) -> Self {
        Self {
            name: behavior.name().to_owned(),
            behavior: Some(behavior),
            started: false,
            enabled: true,
        }
    }

    /// Behavior name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `on_start` has run
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// The wrapped behavior as its concrete type.
    ///
    /// `None` on a type mismatch, and while the behavior is running one of its
    /// own hooks.
    pub fn behavior<B: Behavior>(&self) -> Option<&B> {
        self.behavior.as_deref()?.as_any().downcast_ref()
    }

    /// Mutable access to the wrapped behavior as its concrete type
    pub fn behavior_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        self.behavior.as_deref_mut()?.as_any_mut().downcast_mut()
    }

    /// Persisted parameters of the behavior
    pub fn save_state(&self) -> Value {
        self.behavior.as_ref().map_or(Value::Null, |b| b.save_state())
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn Behavior>> {
        self.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn Behavior>) -> Result<(), Box<dyn Behavior>> {
        if self.behavior.is_some() {
            return Err(behavior);
        }
        self.behavior = Some(behavior);
        Ok(())
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }
}

impl Component for Script {
    const KIND: ComponentKind = ComponentKind::Script;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.script.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.script
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

type BehaviorFactory = Box<dyn Fn(&Value) -> Option<Box<dyn Behavior>>>;

/// Recreates behaviors by name when a scene is loaded
#[derive(Default)]
pub struct BehaviorRegistry {
    factories: HashMap<String, BehaviorFactory>,
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl BehaviorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior whose saved state deserializes back into it
    pub fn register<B: Behavior + DeserializeOwned>(&mut self, name: &str) {
        self.register_with(name, |state| {
            serde_json::from_value::<B>(state.clone())
                .map(|behavior| Box::new(behavior) as Box<dyn Behavior>)
                .map_err(|e| log::warn!("Failed to restore behavior state: {e}"))
                .ok()
        });
    }

    /// Register a custom factory
    pub fn register_with(&mut self, name: &str, factory: impl Fn(&Value) -> Option<Box<dyn Behavior>> + 'static) {
        self.factories.insert(name.to_owned(), Box::new(factory));
    }

    /// Build a behavior from a saved name and state
    pub fn create(&self, name: &str, state: &Value) -> Option<Box<dyn Behavior>> {
        self.factories.get(name).and_then(|factory| factory(state))
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
