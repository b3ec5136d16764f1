//! Countdown timer behavior

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::components::{Behavior, ScriptContext};

type Callback = Box<dyn FnMut(&mut ScriptContext<'_>)>;

/// Fires a callback after a delay, optionally repeating
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Countdown {
    /// Seconds per cycle
    pub duration: f32,
    /// Restart after firing
    pub looping: bool,
    remaining: f32,
    running: bool,
    fired: u32,
    #[serde(skip)]
    on_complete: Option<Callback>,
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("duration", &self.duration)
            .field("looping", &self.looping)
            .field("remaining", &self.remaining)
            .field("running", &self.running)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Countdown {
    /// Running timer of `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            looping: false,
            remaining: duration,
            running: true,
            fired: 0,
            on_complete: None,
        }
    }

    /// Repeat every `duration` seconds
    #[must_use]
    pub const fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Run `callback` each time the timer reaches zero
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut(&mut ScriptContext<'_>) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Restart from the full duration
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    /// Halt without firing
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the timer is counting
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds left in the current cycle
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Times the timer has fired
    pub const fn fired(&self) -> u32 {
        self.fired
    }
}

impl Behavior for Countdown {
    fn name(&self) -> &str {
        "Countdown"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        if !self.running {
            return;
        }

        self.remaining -= ctx.delta_time;
        if self.remaining > 0.0 {
            return;
        }

        self.fired += 1;
        log::debug!("Countdown on {:?} fired ({} times)", ctx.entity, self.fired);
        if let Some(callback) = self.on_complete.as_mut() {
            callback(ctx);
        }
        if self.looping {
            self.start();
        } else {
            self.running = false;
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::scene::Scene;

    #[test]
    fn test_fires_once_then_stops() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);

        let mut scene = Scene::new("test");
        let entity = scene.create_entity("timer");
        scene.add_script(entity, Countdown::new(1.0).on_complete(move |_| counter.set(counter.get() + 1)));

        scene.update(0.5);
        assert_eq!(hits.get(), 0);
        scene.update(0.6);
        assert_eq!(hits.get(), 1);
        scene.update(5.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_looping_restarts() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);

        let mut scene = Scene::new("test");
        let entity = scene.create_entity("timer");
        scene.add_script(
            entity,
            Countdown::new(0.5)
                .with_looping(true)
                .on_complete(move |_| counter.set(counter.get() + 1)),
        );

        for _ in 0..4 {
            scene.update(0.5);
        }
        assert_eq!(hits.get(), 4);
    }

    #[test]
    fn test_callback_can_edit_scene() {
        let mut scene = Scene::new("test");
        let entity = scene.create_entity("fuse");
        scene.add_script(
            entity,
            Countdown::new(0.1).on_complete(|ctx| {
                let id = ctx.entity;
                ctx.scene.remove_entity(id);
            }),
        );

        scene.update(0.2);
        assert!(!scene.contains(entity));
    }

    #[test]
    fn test_state_round_trip_drops_callback() {
        let mut countdown = Countdown::new(2.0).with_looping(true).on_complete(|_| {});
        countdown.stop();

        let restored: Countdown = serde_json::from_value(countdown.save_state()).unwrap();
        assert!(restored.looping);
        assert!(!restored.is_running());
        assert!(restored.on_complete.is_none());
    }
}
