//! Named event hub other scripts can publish to

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::ecs::components::Behavior;

type Listener = Box<dyn FnMut(&Value)>;

/// Handle returned by [`EventDispatcher::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Routes named events with a JSON payload to subscribed callbacks.
///
/// Reach it from another script with `ctx.scene.script_mut::<EventDispatcher>(hub)`.
/// Listeners are code, so nothing is saved with the scene.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("events", &self.listeners.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`
    pub fn on(&mut self, event: &str, listener: impl FnMut(&Value) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe; false if `id` was not listening to `event`
    pub fn off(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners.remove(event);
        }
        removed
    }

    /// Call every listener of `event` in subscription order. Returns how many ran.
    pub fn emit(&mut self, event: &str, data: &Value) -> usize {
        let Some(listeners) = self.listeners.get_mut(event) else {
            log::trace!("No listeners for event '{event}'");
            return 0;
        };
        for (_, listener) in listeners.iter_mut() {
            listener(data);
        }
        listeners.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl Behavior for EventDispatcher {
    fn name(&self) -> &str {
        "EventDispatcher"
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::behaviors::Countdown;
    use crate::scene::Scene;

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&seen);
        let second = Rc::clone(&seen);

        let mut events = EventDispatcher::new();
        events.on("score", move |data| first.borrow_mut().push(format!("a{data}")));
        let id = events.on("score", move |data| second.borrow_mut().push(format!("b{data}")));

        assert_eq!(events.emit("score", &json!(5)), 2);
        assert!(events.off("score", id));
        assert!(!events.off("score", id));
        assert_eq!(events.emit("score", &json!(6)), 1);
        assert_eq!(events.emit("unknown", &Value::Null), 0);

        assert_eq!(*seen.borrow(), vec!["a5", "b5", "a6"]);
    }

    #[test]
    fn test_off_drops_empty_events() {
        let mut events = EventDispatcher::new();
        let id = events.on("ping", |_| {});
        assert_eq!(events.listener_count("ping"), 1);
        assert!(events.off("ping", id));
        assert_eq!(events.listener_count("ping"), 0);
        assert!(!events.off("never", id));
    }

    #[test]
    fn test_scripts_publish_through_a_hub_entity() {
        let payloads = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&payloads);

        let mut scene = Scene::new("test");
        let hub = scene.create_entity("hub");
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("alarm", move |data| sink.borrow_mut().push(data.clone()));
        scene.add_script(hub, dispatcher);

        let clock = scene.create_entity("clock");
        scene.add_script(
            clock,
            Countdown::new(0.5).on_complete(move |ctx| {
                if let Some(events) = ctx.scene.script_mut::<EventDispatcher>(hub) {
                    events.emit("alarm", &json!({ "at": "noon" }));
                }
            }),
        );

        scene.update(0.25);
        scene.update(0.25);

        assert_eq!(*payloads.borrow(), vec![json!({ "at": "noon" })]);
    }
}
