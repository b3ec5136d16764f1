//! Headless sandbox host
//!
//! Builds a small demo scene, drives it through the engine's run loop for a
//! fixed number of frames and logs what a render surface would receive.
//!
//! ```text
//! sandbox [--frames N] [--config engine.toml] [--save scene.json]
//! ```

use std::path::PathBuf;

use rand::prelude::*;
use scene_engine::prelude::*;
use thiserror::Error;

const REPORT_INTERVAL: u64 = 60;
const SPHERE_COUNT: usize = 6;

#[derive(Error, Debug)]
enum ArgsError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid frame count: {0}")]
    InvalidFrames(String),

    #[error("Unknown argument: {0}")]
    Unknown(String),
}

struct Args {
    frames: u32,
    config: Option<PathBuf>,
    save: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut args = Self {
            frames: 300,
            config: None,
            save: None,
        };
        let mut iter = std::env::args().skip(1);
        while let Some(flag) = iter.next() {
            let mut value = || iter.next().ok_or_else(|| ArgsError::MissingValue(flag.clone()));
            match flag.as_str() {
                "--frames" => {
                    let raw = value()?;
                    args.frames = raw.parse().map_err(|_| ArgsError::InvalidFrames(raw))?;
                }
                "--config" => args.config = Some(PathBuf::from(value()?)),
                "--save" => args.save = Some(PathBuf::from(value()?)),
                _ => return Err(ArgsError::Unknown(flag)),
            }
        }
        Ok(args)
    }
}

struct SandboxApp {
    frames_left: u32,
    frame: u64,
    save_path: Option<PathBuf>,
    rng: StdRng,
    player: Option<EntityId>,
}

impl SandboxApp {
    fn new(frames: u32, save_path: Option<PathBuf>) -> Self {
        Self {
            frames_left: frames,
            frame: 0,
            save_path,
            rng: StdRng::seed_from_u64(7),
            player: None,
        }
    }

    fn build_scene(&mut self, scene: &mut Scene) {
        scene.name = "Sandbox".to_owned();
        scene.environment.fog.enabled = true;
        scene.environment.fog.far = 60.0;

        let camera = scene.create_entity("Main Camera");
        scene.insert_component(camera, CameraComponent::primary());
        if let Some(entity) = scene.entity_mut(camera) {
            entity.transform.set_position(0.0, 5.0, 20.0);
            entity.transform.set_rotation(-0.2, 0.0, 0.0);
        }

        let sun = scene.create_entity("Sun");
        scene.insert_component(sun, LightComponent::directional(Vec3::new(1.0, 0.95, 0.9), 1.0));
        if let Some(entity) = scene.entity_mut(sun) {
            entity.transform.set_rotation(-0.8, 0.4, 0.0);
        }

        let ground = scene.create_entity("Ground");
        let plane = GeometryParams {
            width: 40.0,
            depth: 40.0,
            ..GeometryParams::default()
        };
        scene.set_mesh_geometry(ground, GeometryType::Plane, plane);

        let spinner = scene.create_entity("Spinner");
        scene.set_mesh_geometry(spinner, GeometryType::Box, GeometryParams::default());
        scene.add_script(spinner, Rotator::new(Vec3::new(0.3, 1.0, 0.0)));

        let orbit = scene.create_entity("Orbit Light");
        if let Err(e) = scene.add_child(spinner, orbit) {
            log::warn!("Could not attach orbit light: {e}");
        }
        scene.insert_component(orbit, LightComponent::point(Vec3::new(1.0, 0.4, 0.2), 1.0, 15.0));
        scene.add_script(orbit, LightPulse::default());
        if let Some(entity) = scene.entity_mut(orbit) {
            entity.transform.set_position(4.0, 1.0, 0.0);
        }

        let lift = scene.create_entity("Lift");
        scene.set_mesh_geometry(lift, GeometryType::Cylinder, GeometryParams::default());
        if let Some(entity) = scene.entity_mut(lift) {
            let clip = AnimationClip::new("rise")
                .with_keyframe(Channel::PosY, 0.0, 0.0)
                .with_keyframe(Channel::PosY, 2.0, 6.0)
                .with_keyframe(Channel::PosY, 4.0, 0.0)
                .with_keyframe(Channel::PosX, 0.0, -8.0)
                .with_looping(true);
            entity.animation.add_clip(clip);
            entity.animation.play("rise");
        }

        for index in 0..SPHERE_COUNT {
            let ball = scene.create_entity(format!("Ball {index}"));
            scene.set_mesh_geometry(ball, GeometryType::Sphere, GeometryParams::default());
            scene.add_component::<PhysicsComponent>(ball);
            scene.add_script(ball, Bouncer::default());
            let (x, y, z) = (
                self.rng.gen_range(-10.0..10.0),
                self.rng.gen_range(2.0..12.0),
                self.rng.gen_range(-10.0..10.0),
            );
            if let Some(entity) = scene.entity_mut(ball) {
                entity.transform.set_position(x, y, z);
            }
            if let Some(mesh) = scene.get_component_mut::<MeshComponent>(ball) {
                mesh.set_color(self.rng.gen(), self.rng.gen(), self.rng.gen(), 1.0);
            }
        }

        let fountain = scene.create_entity("Fountain");
        scene.add_component::<ParticleSystem>(fountain);
        scene.add_script(fountain, ParticleBurst { rate: 20.0 });
        if let Some(entity) = scene.entity_mut(fountain) {
            entity.transform.set_position(6.0, 0.0, -4.0);
        }

        let patrol = scene.create_entity("Patrol");
        scene.set_mesh_geometry(patrol, GeometryType::Pyramid, GeometryParams::default());
        scene.add_script(
            patrol,
            PathFollower::new(
                vec![
                    Vec3::new(-6.0, 0.5, -6.0),
                    Vec3::new(6.0, 0.5, -6.0),
                    Vec3::new(6.0, 0.5, 6.0),
                    Vec3::new(-6.0, 0.5, 6.0),
                    Vec3::new(-6.0, 0.5, -6.0),
                ],
                0.5,
            ),
        );

        let player = scene.create_entity("Player");
        scene.set_mesh_geometry(player, GeometryType::Torus, GeometryParams::default());
        scene.add_script(player, PlayerController::default());
        self.player = Some(player);

        let escort = scene.create_entity("Escort");
        scene.set_mesh_geometry(escort, GeometryType::Sphere, GeometryParams { radius: 0.5, ..GeometryParams::default() });
        scene.add_script(escort, FollowTarget::new("Player"));

        let target = scene.create_entity("Target Crate");
        scene.set_mesh_geometry(target, GeometryType::Box, GeometryParams::default());
        if let Some(entity) = scene.entity_mut(target) {
            entity.transform.set_position(2.0, 0.5, -2.0);
        }
        scene.add_script(target, Health::new(30.0).on_death(|| log::info!("Target crate destroyed")));

        let hazard = scene.create_entity("Hazard");
        scene.add_script(hazard, DamageZone::new(10.0, 4.0));

        let heartbeat = scene.create_entity("Heartbeat");
        scene.add_script(
            heartbeat,
            Countdown::new(2.0).with_looping(true).on_complete(|ctx| {
                log::info!("Heartbeat at {:.2}s, {} entities", ctx.elapsed, ctx.scene.entity_count());
            }),
        );

        log::info!(
            "Built scene '{}' with {} entities ({} shared geometries)",
            scene.name,
            scene.entity_count(),
            scene.geometry_cache().len()
        );
    }

    /// Scripted input: walk forward, then strafe, in alternating bursts
    fn drive_input(&self, engine: &mut Engine) {
        let phase = (self.frame / 90) % 4;
        let key = match phase {
            0 => Some(KeyCode::W),
            2 => Some(KeyCode::D),
            _ => None,
        };
        for candidate in [KeyCode::W, KeyCode::D] {
            engine.handle_event(AppEvent::KeyInput {
                key: candidate,
                pressed: key == Some(candidate),
            });
        }
    }
}

impl Application for SandboxApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        *engine.registry_mut() = builtin_registry();
        self.build_scene(engine.scene_mut());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frame += 1;
        self.drive_input(engine);
        Ok(())
    }

    fn render(&mut self, scene: &Scene) -> Result<(), AppError> {
        if self.frame % REPORT_INTERVAL != 0 {
            return Ok(());
        }

        let drawables = scene.render_view();
        let triangles: usize = drawables.iter().map(|item| item.geometry.face_count()).sum();
        let particles: usize = scene
            .entities()
            .filter_map(|entity| entity.get_component::<ParticleSystem>())
            .map(ParticleSystem::particle_count)
            .sum();
        let player = self
            .player
            .and_then(|id| scene.entity(id))
            .map_or_else(Vec3::zeros, Entity::world_position);

        log::info!(
            "Frame {}: {} drawables, {} triangles, {} lights, {} particles, camera {}, player at ({:.2}, {:.2}, {:.2})",
            self.frame,
            drawables.len(),
            triangles,
            scene.light_view().len(),
            particles,
            if scene.camera_matrices().is_some() { "ready" } else { "missing" },
            player.x,
            player.y,
            player.z
        );
        Ok(())
    }

    fn should_exit(&self, _engine: &Engine) -> bool {
        self.frames_left == 0
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let Some(path) = self.save_path.take() else {
            return;
        };
        match engine.save_scene_json() {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => log::info!("Saved scene to {}", path.display()),
                Err(e) => log::error!("Failed to write {}: {e}", path.display()),
            },
            Err(e) => log::error!("Failed to serialize scene: {e}"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    scene_engine::foundation::logging::init();

    let args = Args::parse()?;
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    log::info!("Running sandbox for {} frames at {} fps", args.frames, config.target_fps);

    let mut app = SandboxApp::new(args.frames, args.save);
    Engine::run(config, &mut app)?;
    Ok(())
}
