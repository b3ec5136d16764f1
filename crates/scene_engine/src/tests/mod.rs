//! Frame scenarios spanning the scene, components and behaviors

use std::cell::RefCell;
use std::rc::Rc;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::animation::{AnimationClip, Channel};
use crate::ecs::components::{Behavior, ParticleSystem, PhysicsComponent, Script, ScriptContext};
use crate::foundation::math::Vec3;
use crate::geometry::{Geometry, GeometryParams, GeometryType};
use crate::scene::Scene;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    label: &'static str,
    log: Log,
}

impl Recorder {
    fn push(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.label));
    }
}

impl Behavior for Recorder {
    fn on_awake(&mut self, _ctx: &mut ScriptContext<'_>) {
        self.push("awake");
    }

    fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) {
        self.push("start");
    }

    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>) {
        self.push("update");
    }

    fn on_fixed_update(&mut self, _ctx: &mut ScriptContext<'_>) {
        self.push("fixed");
    }

    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {
        self.push("destroy");
    }
}

fn recorder(label: &'static str, log: &Log) -> Recorder {
    Recorder {
        label,
        log: Rc::clone(log),
    }
}

#[test]
fn test_one_gravity_step() {
    crate::foundation::logging::init_for_tests();
    let mut scene = Scene::new("test");
    let ball = scene.create_entity("ball");
    scene.insert_component(ball, PhysicsComponent::new().with_drag(0.0));

    scene.update(1.0);

    let entity = scene.entity(ball).unwrap();
    let physics = entity.get_component::<PhysicsComponent>().unwrap();
    assert_relative_eq!(physics.velocity, Vec3::new(0.0, -9.8, 0.0));
    assert_relative_eq!(entity.transform.position(), Vec3::new(0.0, -9.8, 0.0));
}

#[test]
fn test_drag_scales_velocity() {
    let mut scene = Scene::new("test");
    let ball = scene.create_entity("ball");
    scene.insert_component(ball, PhysicsComponent::new().with_drag(0.5));

    scene.update(0.5);

    let physics = scene.get_component::<PhysicsComponent>(ball).unwrap();
    assert_relative_eq!(physics.velocity.y, -9.8 * 0.5 * 0.5);
}

#[test]
fn test_immovable_bodies_stay_put() {
    let mut scene = Scene::new("test");
    let anchor = scene.create_entity("anchor");
    let platform = scene.create_entity("platform");
    scene.insert_component(anchor, PhysicsComponent::new().with_mass(0.0));
    scene.insert_component(platform, PhysicsComponent::new().with_kinematic(true));
    scene.get_component_mut::<PhysicsComponent>(anchor).unwrap().apply_force(Vec3::new(5.0, 0.0, 0.0));

    for _ in 0..100 {
        scene.update(0.1);
    }

    for id in [anchor, platform] {
        assert_eq!(scene.entity(id).unwrap().transform.position(), Vec3::zeros());
    }
}

#[test]
fn test_inactive_subtree_is_frozen() {
    let log = Log::default();
    let mut scene = Scene::new("test");
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");
    scene.add_child(parent, child).unwrap();

    scene.add_component::<PhysicsComponent>(child);
    scene.insert_component(child, ParticleSystem::with_seed(1));
    scene.add_script(child, recorder("child", &log));
    scene.entity_mut(parent).unwrap().set_active(false);

    scene.update(0.1);

    assert_eq!(*log.borrow(), vec!["child:awake"]);
    assert_eq!(scene.entity(child).unwrap().transform.position(), Vec3::zeros());
    assert_eq!(scene.get_component::<ParticleSystem>(child).unwrap().particle_count(), 0);

    scene.entity_mut(parent).unwrap().set_active(true);
    scene.update(0.1);
    assert_eq!(*log.borrow(), vec!["child:awake", "child:start", "child:update"]);
    assert!(scene.entity(child).unwrap().transform.position().y < 0.0);
    assert_eq!(scene.get_component::<ParticleSystem>(child).unwrap().particle_count(), 5);
}

#[test]
fn test_hooks_run_parent_before_child_in_root_order() {
    let log = Log::default();
    let mut scene = Scene::new("test");
    let first = scene.create_entity("first");
    let second = scene.create_entity("second");
    let child = scene.create_entity("child");
    scene.add_child(first, child).unwrap();

    scene.add_script(second, recorder("second", &log));
    scene.add_script(child, recorder("child", &log));
    scene.add_script(first, recorder("first", &log));
    log.borrow_mut().clear();

    scene.update(0.1);
    scene.update(0.1);

    assert_eq!(
        *log.borrow(),
        vec![
            "first:start",
            "first:update",
            "child:start",
            "child:update",
            "second:start",
            "second:update",
            "first:update",
            "child:update",
            "second:update",
        ]
    );
}

#[test]
fn test_destroy_on_replace_and_removal() {
    let log = Log::default();
    let mut scene = Scene::new("test");
    let root = scene.create_entity("root");
    let leaf = scene.create_entity("leaf");
    scene.add_child(root, leaf).unwrap();

    scene.add_script(leaf, recorder("old", &log));
    scene.add_script(leaf, recorder("new", &log));
    assert_eq!(*log.borrow(), vec!["old:awake", "old:destroy", "new:awake"]);

    log.borrow_mut().clear();
    scene.remove_entity(root);
    assert_eq!(*log.borrow(), vec!["new:destroy"]);
}

#[test]
fn test_inserting_a_script_runs_its_lifecycle() {
    let log = Log::default();
    let mut scene = Scene::new("test");
    let entity = scene.create_entity("entity");

    scene.insert_component(entity, Script::new(recorder("old", &log)));
    let mut replacement = Script::new(recorder("new", &log));
    replacement.enabled = false;
    scene.insert_component(entity, replacement);

    assert_eq!(*log.borrow(), vec!["old:awake", "old:destroy", "new:awake"]);
    let script = scene.get_component::<Script>(entity).unwrap();
    assert!(!script.enabled);

    scene.update(0.1);
    assert_eq!(log.borrow().len(), 3);
}

struct SelfDestruct;

impl Behavior for SelfDestruct {
    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let id = ctx.entity;
        ctx.scene.remove_entity(id);
    }
}

#[test]
fn test_script_may_remove_its_own_entity() {
    crate::foundation::logging::init_for_tests();
    let mut scene = Scene::new("test");
    let doomed = scene.create_entity("doomed");
    let child = scene.create_entity("child");
    let survivor = scene.create_entity("survivor");
    scene.add_child(doomed, child).unwrap();
    scene.add_script(doomed, SelfDestruct);

    scene.update(0.1);

    assert!(!scene.contains(doomed));
    assert!(!scene.contains(child));
    assert_eq!(scene.root_entities(), &[survivor]);
    scene.update(0.1);
}

#[test]
fn test_disabled_script_receives_no_hooks() {
    let log = Log::default();
    let mut scene = Scene::new("test");
    let entity = scene.create_entity("entity");
    scene.add_script(entity, recorder("s", &log));
    scene.get_component_mut::<Script>(entity).unwrap().enabled = false;

    scene.update(0.1);
    assert_eq!(*log.borrow(), vec!["s:awake"]);
}

#[test]
fn test_world_matrix_composes_parent() {
    let mut scene = Scene::new("test");
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");
    scene.add_child(parent, child).unwrap();

    {
        let transform = &mut scene.entity_mut(parent).unwrap().transform;
        transform.set_position(1.0, 0.0, 0.0);
        transform.set_rotation(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        transform.set_scale(2.0, 2.0, 2.0);
    }
    scene.entity_mut(child).unwrap().transform.set_position(1.0, 0.0, 0.0);

    scene.update(0.0);

    let world = scene.entity(child).unwrap().world_position();
    assert_abs_diff_eq!(world, Vec3::new(1.0, 0.0, -2.0), epsilon = 1e-5);
}

#[test]
fn test_animation_drives_transform() {
    let mut scene = Scene::new("test");
    let door = scene.create_entity("door");
    let clip = AnimationClip::new("open")
        .with_keyframe(Channel::PosY, 0.0, 0.0)
        .with_keyframe(Channel::PosY, 2.0, 10.0)
        .with_looping(false);
    {
        let animation = &mut scene.entity_mut(door).unwrap().animation;
        animation.add_clip(clip);
        assert!(animation.play("open"));
    }

    scene.update(1.0);
    assert_relative_eq!(scene.entity(door).unwrap().transform.position().y, 5.0);
    assert_relative_eq!(scene.entity(door).unwrap().transform.scale(), Vec3::new(1.0, 1.0, 1.0));

    scene.update(5.0);
    let entity = scene.entity(door).unwrap();
    assert!(!entity.animation.is_playing());
    assert_relative_eq!(entity.transform.position().y, 10.0);
}

#[test]
fn test_particle_lifetime_boundary() {
    let mut scene = Scene::new("test");
    let emitter = scene.create_entity("emitter");
    scene.insert_component(emitter, ParticleSystem::with_seed(9).with_emitting(false));
    scene
        .get_component_mut::<ParticleSystem>(emitter)
        .unwrap()
        .emit(1, Vec3::zeros());

    scene.update(1.875);
    assert_eq!(scene.get_component::<ParticleSystem>(emitter).unwrap().particle_count(), 1);

    scene.update(0.125);
    assert_eq!(scene.get_component::<ParticleSystem>(emitter).unwrap().particle_count(), 0);
}

#[test]
fn test_particles_spawn_at_world_origin() {
    let mut scene = Scene::new("test");
    let parent = scene.create_entity("parent");
    let emitter = scene.create_entity("emitter");
    scene.add_child(parent, emitter).unwrap();
    scene.entity_mut(parent).unwrap().transform.set_position(0.0, 10.0, 0.0);
    scene.entity_mut(emitter).unwrap().transform.set_position(3.0, 0.0, 0.0);
    scene.insert_component(emitter, ParticleSystem::with_seed(4));

    scene.update(0.0);
    scene.get_component_mut::<ParticleSystem>(emitter).unwrap().emit(1, Vec3::zeros());
    scene.update(0.02);

    let particles = scene.get_component::<ParticleSystem>(emitter).unwrap();
    let spawned = particles.particles().last().unwrap();
    let travelled = spawned.velocity * 0.02;
    assert_relative_eq!(spawned.position - travelled, Vec3::new(3.0, 10.0, 0.0), epsilon = 1e-4);
}

#[test]
fn test_seeded_scenes_emit_identically() {
    let config = crate::config::EngineConfig {
        particle_seed: Some(42),
        ..Default::default()
    };
    let run = || {
        let mut scene = Scene::with_config("seeded", &config);
        let emitter = scene.create_entity("emitter");
        scene.add_component::<ParticleSystem>(emitter);
        scene.update(0.1);
        scene.update(0.1);
        scene
            .get_component::<ParticleSystem>(emitter)
            .unwrap()
            .particles()
            .iter()
            .map(|p| p.position)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_geometry_is_deterministic() {
    let params = GeometryParams::default();
    for shape in [
        GeometryType::Box,
        GeometryType::Sphere,
        GeometryType::Cylinder,
        GeometryType::Plane,
        GeometryType::Pyramid,
        GeometryType::Torus,
    ] {
        let a = Geometry::generate(shape, params);
        let b = Geometry::generate(shape, params);
        assert_eq!(a.vertex_bytes(), b.vertex_bytes());
        assert_eq!(a.index_bytes(), b.index_bytes());
    }
    assert!(Geometry::generate(GeometryType::Unknown, params).is_empty());
}
