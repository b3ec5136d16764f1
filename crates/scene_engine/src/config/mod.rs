//! Configuration system

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// How the frame driver turns wall-clock time into simulation steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimestepMode {
    /// Raw elapsed delta is passed straight to the scene (frame-rate dependent)
    Variable,
    /// Elapsed time is consumed in whole steps of `step` seconds
    Fixed {
        /// Step length in seconds
        step: f32,
        /// Upper bound on steps run in a single tick
        max_substeps: u32,
    },
}

impl Default for TimestepMode {
    fn default() -> Self {
        Self::Variable
    }
}

/// Engine-level configuration consumed by the frame driver and scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target ticks per second for hosts using the built-in run loop
    pub target_fps: u32,

    /// Largest delta accepted from the host before clamping (seconds).
    /// `None` passes the host's delta through unchanged.
    pub max_delta: Option<f32>,

    /// Gravity assigned to newly attached physics components
    pub default_gravity: [f32; 3],

    /// Seed for particle emission; `None` seeds from entropy
    pub particle_seed: Option<u64>,

    /// Timestep policy
    pub timestep: TimestepMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_delta: None,
            default_gravity: [0.0, -9.8, 0.0],
            particle_seed: None,
            timestep: TimestepMode::Variable,
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Target interval between ticks
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }

    /// Gravity as a vector
    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.default_gravity[0], self.default_gravity[1], self.default_gravity[2])
    }
}
