//! Application trait and lifecycle management

use thiserror::Error;

use crate::engine::{Engine, EngineError};
use crate::input::{KeyCode, MouseButton};
use crate::scene::Scene;

/// Application lifecycle trait
///
/// Implement this to drive a scene through [`Engine::run`].
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first tick. Build the initial scene here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the scene is stepped. Feed host events with
    /// [`Engine::handle_event`] here.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Present the scene after it was stepped. The scene is read-only here.
    fn render(&mut self, _scene: &Scene) -> Result<(), AppError> {
        Ok(())
    }

    /// Whether the run loop should stop before the next frame
    fn should_exit(&self, _engine: &Engine) -> bool {
        false
    }

    /// Cleanup the application
    ///
    /// Called once after the loop ends.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Host events routed into the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Host asked to close
    CloseRequested,

    /// Host lost focus; held keys and buttons are released
    FocusLost,

    /// Key input event
    KeyInput {
        /// The key that was pressed/released
        key: KeyCode,
        /// Whether the key was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Pointer moved to a new position
    MouseMoved {
        /// New X coordinate
        x: f32,
        /// New Y coordinate
        y: f32,
    },
}
