//! Frame driver
//!
//! The engine owns the scene, the input state and the timing policy. Hosts
//! either call [`Engine::tick`] from their own scheduler or hand control to
//! [`Engine::run`].

use std::path::Path;

use thiserror::Error;

use crate::application::{AppEvent, Application};
use crate::config::{Config, ConfigError, EngineConfig, TimestepMode};
use crate::ecs::components::BehaviorRegistry;
use crate::foundation::time::{StepAccumulator, Timer};
use crate::input::{InputSnapshot, InputState};
use crate::scene::{PersistenceError, Scene, SceneData};

/// Main engine struct
pub struct Engine {
    scene: Scene,
    input: InputState,
    timer: Timer,
    config: EngineConfig,
    accumulator: Option<StepAccumulator>,
    registry: BehaviorRegistry,
    running: bool,
}

impl Engine {
    /// Create an engine with an empty scene
    pub fn new(config: EngineConfig) -> Self {
        log::info!("Initializing engine ({:?} timestep)", config.timestep);
        let accumulator = match config.timestep {
            TimestepMode::Variable => None,
            TimestepMode::Fixed { step, max_substeps } => Some(StepAccumulator::new(step, max_substeps)),
        };

        Self {
            scene: Scene::with_config("Scene", &config),
            input: InputState::new(),
            timer: Timer::new(),
            config,
            accumulator,
            registry: BehaviorRegistry::new(),
            running: true,
        }
    }

    /// Create an engine from a `.toml` or `.ron` configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let config = EngineConfig::load_from_file(path)?;
        Ok(Self::new(config))
    }

    /// Run the built-in loop until the application asks to exit
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config);

        app.initialize(&mut engine)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        engine.timer.reset();
        let interval = engine.config.frame_interval();

        while engine.running && !app.should_exit(&engine) {
            let delta_time = engine.timer.update();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::Application(format!("App update: {e}")))?;

            engine.tick(delta_time);

            app.render(&engine.scene)
                .map_err(|e| EngineError::Application(format!("App render: {e}")))?;

            std::thread::sleep(engine.timer.remaining_in_frame(interval));
        }

        app.cleanup(&mut engine);

        log::info!("Engine shutdown complete after {} frames", engine.timer.frame_count());
        Ok(())
    }

    /// Advance the simulation by `delta_time` seconds.
    ///
    /// Negative or non-finite deltas count as zero. Deltas above
    /// `max_delta`, when one is configured, are clamped. Returns the number
    /// of scene updates run.
    pub fn tick(&mut self, delta_time: f32) -> u32 {
        let delta_time = self.clamp_delta(delta_time);

        match self.accumulator.as_mut() {
            None => {
                let input = self.input.snapshot();
                self.scene.update_with_input(delta_time, &input);
                1
            }
            Some(accumulator) => {
                let step = accumulator.step();
                let steps = accumulator.advance(delta_time);
                if steps == 0 {
                    return 0;
                }

                // Pointer movement is delivered to the first substep only
                let input = self.input.snapshot();
                step_fixed(&mut self.scene, step, &input);
                let held = input.without_pointer_delta();
                for _ in 1..steps {
                    step_fixed(&mut self.scene, step, &held);
                }
                steps
            }
        }
    }

    /// Measure wall-clock time since the previous call and tick with it
    pub fn tick_realtime(&mut self) -> f32 {
        let delta_time = self.timer.update();
        self.tick(delta_time);
        delta_time
    }

    fn clamp_delta(&self, delta_time: f32) -> f32 {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return 0.0;
        }
        match self.config.max_delta {
            Some(max_delta) if delta_time > max_delta => {
                log::warn!("Frame took {delta_time:.3}s, clamping to {max_delta:.3}s");
                max_delta
            }
            _ => delta_time,
        }
    }

    /// Feed a host event into the input state
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CloseRequested => self.quit(),
            AppEvent::FocusLost => self.input.clear(),
            AppEvent::KeyInput { key, pressed: true } => self.input.key_down(key),
            AppEvent::KeyInput { key, pressed: false } => self.input.key_up(key),
            AppEvent::MouseButton { button, pressed: true } => self.input.button_down(button),
            AppEvent::MouseButton { button, pressed: false } => self.input.button_up(button),
            AppEvent::MouseMoved { x, y } => self.input.pointer_moved(x, y),
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the run loop continues
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The active scene
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the active scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Swap in a new scene, applying this engine's component defaults to it
    pub fn set_scene(&mut self, mut scene: Scene) -> Scene {
        scene.apply_config(&self.config);
        log::info!("Switching to scene '{}'", scene.name);
        std::mem::replace(&mut self.scene, scene)
    }

    /// Raw input state for hosts that bypass [`Engine::handle_event`]
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Behaviors known when loading scenes
    pub fn registry_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.registry
    }

    /// Engine configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frame timer
    pub const fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Replace the active scene with a JSON document
    pub fn load_scene_json(&mut self, json: &str) -> Result<(), EngineError> {
        let data: SceneData = serde_json::from_str(json).map_err(PersistenceError::from)?;
        let mut scene = Scene::with_config(data.name.clone(), &self.config);
        scene.load_data(&data, &self.registry)?;
        log::info!("Switching to scene '{}'", scene.name);
        self.scene = scene;
        Ok(())
    }

    /// Encode the active scene as JSON
    pub fn save_scene_json(&self) -> Result<String, EngineError> {
        Ok(self.scene.to_json()?)
    }
}

fn step_fixed(scene: &mut Scene, step: f32, input: &InputSnapshot) {
    scene.fixed_update(step, input);
    scene.update_with_input(step, input);
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Scene document could not be read or written
    #[error("Scene error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Application callback failed
    #[error("Application error: {0}")]
    Application(String),
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::application::AppError;
    use crate::behaviors::{builtin_registry, Rotator};
    use crate::ecs::components::{Behavior, PhysicsComponent, ScriptContext};
    use crate::foundation::math::Vec3;
    use crate::input::KeyCode;

    #[test]
    fn test_variable_tick_passes_delta_through() {
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.tick(0.1), 1);
        assert_relative_eq!(engine.scene().elapsed(), 0.1);
    }

    #[test]
    fn test_tick_clamps_bad_deltas() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.tick(-1.0);
        engine.tick(f32::NAN);
        assert_relative_eq!(engine.scene().elapsed(), 0.0);

        engine.tick(10.0);
        assert_relative_eq!(engine.scene().elapsed(), 10.0);
    }

    #[test]
    fn test_configured_max_delta_clamps_stalls() {
        let mut engine = Engine::new(EngineConfig {
            max_delta: Some(0.25),
            ..EngineConfig::default()
        });
        engine.tick(10.0);
        assert_relative_eq!(engine.scene().elapsed(), 0.25);
    }

    #[test]
    fn test_default_tick_uses_raw_delta_for_physics() {
        let mut engine = Engine::new(EngineConfig::default());
        let ball = engine.scene_mut().create_entity("ball");
        engine
            .scene_mut()
            .insert_component(ball, PhysicsComponent::new().with_drag(0.0));

        engine.tick(1.0);

        let physics = engine.scene().get_component::<PhysicsComponent>(ball).unwrap();
        assert_relative_eq!(physics.velocity.y, -9.8);
        assert_relative_eq!(engine.scene().entity(ball).unwrap().transform.position().y, -9.8);
    }

    struct PointerLog {
        deltas: Rc<RefCell<Vec<f32>>>,
    }

    impl Behavior for PointerLog {
        fn on_fixed_update(&mut self, ctx: &mut ScriptContext<'_>) {
            self.deltas.borrow_mut().push(ctx.input.pointer_delta().x);
        }
    }

    #[test]
    fn test_fixed_substeps_share_one_pointer_delta() {
        let mut engine = Engine::new(EngineConfig {
            timestep: TimestepMode::Fixed { step: 0.125, max_substeps: 8 },
            ..EngineConfig::default()
        });
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let watcher = engine.scene_mut().create_entity("pointer");
        engine.scene_mut().add_script(watcher, PointerLog { deltas: Rc::clone(&deltas) });

        engine.handle_event(AppEvent::MouseMoved { x: 4.0, y: 0.0 });
        assert_eq!(engine.tick(0.0625), 0);
        assert!(deltas.borrow().is_empty());

        assert_eq!(engine.tick(0.3125), 3);
        assert_eq!(*deltas.borrow(), vec![4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fixed_tick_runs_whole_steps() {
        let config = EngineConfig {
            timestep: TimestepMode::Fixed { step: 0.1, max_substeps: 8 },
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config);

        assert_eq!(engine.tick(0.05), 0);
        assert_eq!(engine.tick(0.1), 1);
        assert_eq!(engine.scene().frame_count(), 1);
        assert_relative_eq!(engine.scene().elapsed(), 0.1);
    }

    struct FixedCounter;

    impl Behavior for FixedCounter {
        fn on_fixed_update(&mut self, ctx: &mut ScriptContext<'_>) {
            if let Some(transform) = ctx.transform_mut() {
                transform.translate(1.0, 0.0, 0.0);
            }
        }
    }

    #[test]
    fn test_fixed_update_only_under_fixed_timestep() {
        let mut variable = Engine::new(EngineConfig::default());
        let a = variable.scene_mut().create_entity("a");
        variable.scene_mut().add_script(a, FixedCounter);
        variable.tick(0.2);
        assert_relative_eq!(variable.scene().entity(a).unwrap().transform.position().x, 0.0);

        let mut fixed = Engine::new(EngineConfig {
            timestep: TimestepMode::Fixed { step: 0.1, max_substeps: 8 },
            ..EngineConfig::default()
        });
        let b = fixed.scene_mut().create_entity("b");
        fixed.scene_mut().add_script(b, FixedCounter);
        fixed.tick(0.25);
        assert_relative_eq!(fixed.scene().entity(b).unwrap().transform.position().x, 2.0);
    }

    #[test]
    fn test_fixed_physics_is_frame_rate_independent() {
        let config = EngineConfig {
            timestep: TimestepMode::Fixed { step: 0.125, max_substeps: 16 },
            ..EngineConfig::default()
        };
        let mut coarse = Engine::new(config.clone());
        let mut fine = Engine::new(config);
        for engine in [&mut coarse, &mut fine] {
            let ball = engine.scene_mut().create_entity("ball");
            engine.scene_mut().add_component::<PhysicsComponent>(ball);
        }

        for _ in 0..4 {
            coarse.tick(0.25);
        }
        for _ in 0..8 {
            fine.tick(0.125);
        }

        let y = |engine: &Engine| {
            let ball = engine.scene().find_by_name("ball").unwrap();
            engine.scene().entity(ball).unwrap().transform.position().y
        };
        assert_eq!(coarse.scene().frame_count(), 8);
        assert_eq!(fine.scene().frame_count(), 8);
        assert_relative_eq!(y(&coarse), y(&fine), epsilon = 1e-5);
    }

    #[test]
    fn test_config_gravity_reaches_new_components() {
        let mut engine = Engine::new(EngineConfig {
            default_gravity: [0.0, -1.62, 0.0],
            ..EngineConfig::default()
        });
        let lander = engine.scene_mut().create_entity("lander");
        let physics = engine.scene_mut().add_component::<PhysicsComponent>(lander).unwrap();
        assert_relative_eq!(physics.gravity, Vec3::new(0.0, -1.62, 0.0));
    }

    #[test]
    fn test_events_feed_scripts() {
        let mut engine = Engine::new(EngineConfig::default());
        let player = engine.scene_mut().create_entity("player");
        engine.scene_mut().add_script(player, crate::behaviors::PlayerController::default());

        engine.handle_event(AppEvent::KeyInput { key: KeyCode::D, pressed: true });
        engine.tick(0.1);
        let x = engine.scene().entity(player).unwrap().transform.position().x;
        assert_relative_eq!(x, 1.0);

        engine.handle_event(AppEvent::FocusLost);
        engine.tick(0.1);
        assert_relative_eq!(engine.scene().entity(player).unwrap().transform.position().x, x);
    }

    #[test]
    fn test_scene_json_through_engine() {
        let mut engine = Engine::new(EngineConfig::default());
        *engine.registry_mut() = builtin_registry();
        let cube = engine.scene_mut().create_entity("cube");
        engine.scene_mut().add_script(cube, Rotator::default());

        let json = engine.save_scene_json().unwrap();
        engine.load_scene_json(&json).unwrap();
        let cube = engine.scene().find_by_name("cube").unwrap();
        assert!(engine.scene().get_component::<crate::ecs::components::Script>(cube).is_some());
        assert!(engine.load_scene_json("{ not json").is_err());
    }

    struct Frames {
        remaining: u32,
        rendered: usize,
        cleaned: bool,
    }

    impl Application for Frames {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            engine.scene_mut().create_entity("only");
            Ok(())
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.remaining = self.remaining.saturating_sub(1);
            Ok(())
        }

        fn render(&mut self, scene: &Scene) -> Result<(), AppError> {
            self.rendered += scene.entity_count();
            Ok(())
        }

        fn should_exit(&self, _engine: &Engine) -> bool {
            self.remaining == 0
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned = true;
        }
    }

    #[test]
    fn test_run_loop_drives_application() {
        let mut app = Frames { remaining: 3, rendered: 0, cleaned: false };
        let config = EngineConfig { target_fps: 1000, ..EngineConfig::default() };
        Engine::run(config, &mut app).unwrap();
        assert_eq!(app.rendered, 3);
        assert!(app.cleaned);
    }
}
