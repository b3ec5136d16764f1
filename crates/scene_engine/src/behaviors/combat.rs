//! Hit points, damage areas and proximity contacts

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::components::{Behavior, ScriptContext, Transform};
use crate::ecs::EntityId;

type HurtCallback = Box<dyn FnMut(f32)>;
type DeathCallback = Box<dyn FnMut()>;
type HitCallback = Box<dyn FnMut(&mut ScriptContext<'_>, EntityId, f32)>;
type ContactCallback = Box<dyn FnMut(&mut ScriptContext<'_>, EntityId)>;

/// Hit points with hurt and death notifications
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Health {
    /// Upper bound for healing
    pub max_health: f32,
    /// Hit points left
    pub current_health: f32,
    #[serde(skip)]
    on_hurt: Option<HurtCallback>,
    #[serde(skip)]
    on_death: Option<DeathCallback>,
}

impl fmt::Debug for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Health")
            .field("max_health", &self.max_health)
            .field("current_health", &self.current_health)
            .finish_non_exhaustive()
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    /// Full health of `max_health` points
    pub fn new(max_health: f32) -> Self {
        Self {
            max_health,
            current_health: max_health,
            on_hurt: None,
            on_death: None,
        }
    }

    /// Run `callback` with the amount of every hit taken
    #[must_use]
    pub fn on_hurt(mut self, callback: impl FnMut(f32) + 'static) -> Self {
        self.on_hurt = Some(Box::new(callback));
        self
    }

    /// Run `callback` when health reaches zero
    #[must_use]
    pub fn on_death(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_death = Some(Box::new(callback));
        self
    }

    /// Subtract `amount`; ignored once dead or for non-positive amounts
    pub fn take_damage(&mut self, amount: f32) {
        if self.is_dead() || amount <= 0.0 {
            return;
        }

        self.current_health -= amount;
        if let Some(callback) = self.on_hurt.as_mut() {
            callback(amount);
        }
        if self.current_health <= 0.0 {
            self.current_health = 0.0;
            if let Some(callback) = self.on_death.as_mut() {
                callback();
            }
        }
    }

    /// Add `amount`, capped at `max_health`
    pub fn heal(&mut self, amount: f32) {
        if amount > 0.0 {
            self.current_health = (self.current_health + amount).min(self.max_health);
        }
    }

    /// Remaining fraction in `[0, 1]`
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0.0
    }
}

impl Behavior for Health {
    fn name(&self) -> &str {
        "Health"
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Periodically damages every other entity within range that carries [`Health`]
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DamageZone {
    /// Damage per hit
    pub damage: f32,
    /// Reach from the zone's position
    pub range: f32,
    /// Seconds between hits
    pub damage_interval: f32,
    #[serde(skip)]
    since_last_hit: f32,
    #[serde(skip)]
    on_hit: Option<HitCallback>,
}

impl fmt::Debug for DamageZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageZone")
            .field("damage", &self.damage)
            .field("range", &self.range)
            .field("damage_interval", &self.damage_interval)
            .finish_non_exhaustive()
    }
}

impl Default for DamageZone {
    fn default() -> Self {
        Self {
            damage: 10.0,
            range: 5.0,
            damage_interval: 1.0,
            since_last_hit: 0.0,
            on_hit: None,
        }
    }
}

impl DamageZone {
    pub fn new(damage: f32, range: f32) -> Self {
        Self {
            damage,
            range,
            ..Default::default()
        }
    }

    /// Run `callback` for every entity hit, with the damage dealt
    #[must_use]
    pub fn on_hit(mut self, callback: impl FnMut(&mut ScriptContext<'_>, EntityId, f32) + 'static) -> Self {
        self.on_hit = Some(Box::new(callback));
        self
    }
}

impl Behavior for DamageZone {
    fn name(&self) -> &str {
        "DamageZone"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        self.since_last_hit += ctx.delta_time;
        if self.since_last_hit < self.damage_interval {
            return;
        }
        self.since_last_hit = 0.0;

        let Some(center) = ctx.transform().map(Transform::position) else {
            return;
        };
        let zone = ctx.entity;
        for target in ctx.scene.entities_within(center, self.range) {
            if target == zone {
                continue;
            }
            let Some(health) = ctx.scene.script_mut::<Health>(target) else {
                continue;
            };
            health.take_damage(self.damage);
            log::debug!("DamageZone on {zone:?} hit {target:?} for {}", self.damage);
            if let Some(callback) = self.on_hit.as_mut() {
                callback(ctx, target, self.damage);
            }
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Reports entities that come within `collision_radius`
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionDetector {
    pub collision_radius: f32,
    #[serde(skip)]
    contacts: Vec<EntityId>,
    #[serde(skip)]
    on_collision_enter: Option<ContactCallback>,
    #[serde(skip)]
    on_collision_exit: Option<ContactCallback>,
}

impl fmt::Debug for CollisionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionDetector")
            .field("collision_radius", &self.collision_radius)
            .field("contacts", &self.contacts)
            .finish_non_exhaustive()
    }
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CollisionDetector {
    pub fn new(collision_radius: f32) -> Self {
        Self {
            collision_radius,
            contacts: Vec::new(),
            on_collision_enter: None,
            on_collision_exit: None,
        }
    }

    /// Run `callback` when another entity enters the radius
    #[must_use]
    pub fn on_collision_enter(mut self, callback: impl FnMut(&mut ScriptContext<'_>, EntityId) + 'static) -> Self {
        self.on_collision_enter = Some(Box::new(callback));
        self
    }

    /// Run `callback` when a contact leaves the radius or disappears
    #[must_use]
    pub fn on_collision_exit(mut self, callback: impl FnMut(&mut ScriptContext<'_>, EntityId) + 'static) -> Self {
        self.on_collision_exit = Some(Box::new(callback));
        self
    }

    /// Entities within the radius as of the last update
    pub fn contacts(&self) -> &[EntityId] {
        &self.contacts
    }
}

impl Behavior for CollisionDetector {
    fn name(&self) -> &str {
        "CollisionDetector"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let Some(center) = ctx.transform().map(Transform::position) else {
            return;
        };
        let me = ctx.entity;
        let current: Vec<EntityId> = ctx
            .scene
            .entities_within(center, self.collision_radius)
            .into_iter()
            .filter(|id| *id != me)
            .collect();

        let previous = std::mem::replace(&mut self.contacts, current);
        for other in previous.iter().filter(|id| !self.contacts.contains(id)) {
            log::debug!("{me:?} lost contact with {other:?}");
            if let Some(callback) = self.on_collision_exit.as_mut() {
                callback(ctx, *other);
            }
        }
        for other in self.contacts.iter().filter(|id| !previous.contains(id)) {
            log::debug!("{me:?} touched {other:?}");
            if let Some(callback) = self.on_collision_enter.as_mut() {
                callback(ctx, *other);
            }
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::scene::Scene;

    #[test]
    fn test_health_clamps_and_dies_once() {
        let hurt = Rc::new(RefCell::new(Vec::new()));
        let deaths = Rc::new(Cell::new(0));
        let hurt_log = Rc::clone(&hurt);
        let death_count = Rc::clone(&deaths);

        let mut health = Health::new(50.0)
            .on_hurt(move |amount| hurt_log.borrow_mut().push(amount))
            .on_death(move || death_count.set(death_count.get() + 1));

        health.take_damage(20.0);
        assert_relative_eq!(health.health_percent(), 0.6);
        health.heal(100.0);
        assert_relative_eq!(health.current_health, 50.0);

        health.take_damage(80.0);
        assert!(health.is_dead());
        assert_relative_eq!(health.current_health, 0.0);
        health.take_damage(10.0);

        assert_eq!(*hurt.borrow(), vec![20.0, 80.0]);
        assert_eq!(deaths.get(), 1);
    }

    #[test]
    fn test_health_percent_without_max() {
        assert_eq!(Health::new(0.0).health_percent(), 0.0);
    }

    #[test]
    fn test_damage_zone_hits_health_in_range_each_interval() {
        let mut scene = Scene::new("test");
        let zone = scene.create_entity("zone");
        let near = scene.create_entity("near");
        let far = scene.create_entity("far");
        let bystander = scene.create_entity("bystander");
        scene.entity_mut(near).unwrap().transform.set_position(3.0, 0.0, 0.0);
        scene.entity_mut(far).unwrap().transform.set_position(8.0, 0.0, 0.0);
        scene.add_script(zone, DamageZone::new(10.0, 5.0));
        scene.add_script(near, Health::default());
        scene.add_script(far, Health::default());

        scene.update(0.5);
        assert_relative_eq!(scene.script::<Health>(near).unwrap().current_health, 100.0);

        scene.update(0.5);
        scene.update(1.0);
        assert_relative_eq!(scene.script::<Health>(near).unwrap().current_health, 80.0);
        assert_relative_eq!(scene.script::<Health>(far).unwrap().current_health, 100.0);
        assert!(scene.script::<Health>(bystander).is_none());
    }

    #[test]
    fn test_damage_zone_reports_each_hit() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let hit_log = Rc::clone(&hits);

        let mut scene = Scene::new("test");
        let zone = scene.create_entity("zone");
        let victim = scene.create_entity("victim");
        scene.add_script(zone, DamageZone::new(25.0, 2.0).on_hit(move |_, target, damage| {
            hit_log.borrow_mut().push((target, damage));
        }));
        scene.add_script(victim, Health::new(40.0));

        scene.update(1.0);
        scene.update(1.0);

        assert_eq!(*hits.borrow(), vec![(victim, 25.0), (victim, 25.0)]);
        assert!(scene.script::<Health>(victim).unwrap().is_dead());
    }

    #[test]
    fn test_collision_detector_reports_enter_and_exit() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let entered = Rc::clone(&events);
        let exited = Rc::clone(&events);

        let mut scene = Scene::new("test");
        let sensor = scene.create_entity("sensor");
        let rock = scene.create_entity("rock");
        scene.entity_mut(rock).unwrap().transform.set_position(5.0, 0.0, 0.0);
        scene.add_script(
            sensor,
            CollisionDetector::new(1.0)
                .on_collision_enter(move |_, other| entered.borrow_mut().push(("enter", other)))
                .on_collision_exit(move |_, other| exited.borrow_mut().push(("exit", other))),
        );

        scene.update(0.1);
        assert!(events.borrow().is_empty());

        scene.entity_mut(rock).unwrap().transform.set_position(0.5, 0.0, 0.0);
        scene.update(0.1);
        scene.update(0.1);
        assert_eq!(scene.script::<CollisionDetector>(sensor).unwrap().contacts(), &[rock]);

        scene.entity_mut(rock).unwrap().set_active(false);
        scene.update(0.1);

        assert_eq!(*events.borrow(), vec![("enter", rock), ("exit", rock)]);
        assert!(scene.script::<CollisionDetector>(sensor).unwrap().contacts().is_empty());
    }

    #[test]
    fn test_parameters_round_trip() {
        let zone: DamageZone = serde_json::from_value(DamageZone::new(3.0, 7.0).save_state()).unwrap();
        assert_relative_eq!(zone.damage, 3.0);
        assert_relative_eq!(zone.range, 7.0);
        assert_relative_eq!(zone.damage_interval, 1.0);

        let mut health = Health::new(60.0);
        health.take_damage(15.0);
        let restored: Health = serde_json::from_value(health.save_state()).unwrap();
        assert_relative_eq!(restored.current_health, 45.0);
    }
}
