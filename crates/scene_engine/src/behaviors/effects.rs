//! Behaviors that drive lights, particles and sounds

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::components::{AudioSource, Behavior, LightComponent, ParticleSystem, ScriptContext};

/// Extra particle emission on top of the system's own rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleBurst {
    /// Particles per second
    pub rate: f32,
}

impl Default for ParticleBurst {
    fn default() -> Self {
        Self { rate: 100.0 }
    }
}

impl Behavior for ParticleBurst {
    fn name(&self) -> &str {
        "ParticleBurst"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let count = (self.rate * ctx.delta_time).ceil().max(0.0) as usize;
        let Some(entity) = ctx.this_mut() else {
            return;
        };
        let origin = entity.world_position();
        if let Some(particles) = entity.get_component_mut::<ParticleSystem>() {
            particles.emit(count, origin);
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Sinusoidal light intensity driven by scene time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightPulse {
    /// Angular frequency in radians per second
    pub frequency: f32,
    /// Intensity at the trough
    pub min_intensity: f32,
    /// Intensity at the crest
    pub max_intensity: f32,
}

impl Default for LightPulse {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            min_intensity: 0.5,
            max_intensity: 2.0,
        }
    }
}

impl LightPulse {
    /// Intensity at scene time `elapsed`
    pub fn intensity_at(&self, elapsed: f32) -> f32 {
        let pulse = (elapsed * self.frequency).sin();
        self.min_intensity + (self.max_intensity - self.min_intensity) * (pulse + 1.0) / 2.0
    }
}

impl Behavior for LightPulse {
    fn name(&self) -> &str {
        "LightPulse"
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        let intensity = self.intensity_at(ctx.elapsed);
        if let Some(light) = ctx.component_mut::<LightComponent>() {
            light.set_intensity(intensity);
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Plays the entity's [`AudioSource`] on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioTrigger {
    /// Clip to play; empty keeps the source's own clip
    pub sound_name: String,
    /// Volume applied before playing
    pub volume: f32,
    /// Play once when the script starts
    pub play_on_start: bool,
    #[serde(skip)]
    pending: bool,
}

impl Default for AudioTrigger {
    fn default() -> Self {
        Self {
            sound_name: String::new(),
            volume: 1.0,
            play_on_start: false,
            pending: false,
        }
    }
}

impl AudioTrigger {
    pub fn new(sound_name: impl Into<String>) -> Self {
        Self {
            sound_name: sound_name.into(),
            ..Default::default()
        }
    }

    /// Play on the next update
    pub fn trigger(&mut self) {
        self.pending = true;
    }

    /// Start the entity's audio source now. Returns whether it is playing.
    pub fn play_sound(&self, ctx: &mut ScriptContext<'_>) -> bool {
        let Some(audio) = ctx.component_mut::<AudioSource>() else {
            log::warn!("AudioTrigger on {:?} has no audio source", ctx.entity);
            return false;
        };
        if !self.sound_name.is_empty() {
            audio.clip = Some(self.sound_name.clone());
        }
        audio.set_volume(self.volume);
        audio.play();
        audio.is_playing
    }
}

impl Behavior for AudioTrigger {
    fn name(&self) -> &str {
        "AudioTrigger"
    }

    fn on_start(&mut self, ctx: &mut ScriptContext<'_>) {
        if self.play_on_start {
            self.play_sound(ctx);
        }
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) {
        if std::mem::take(&mut self.pending) {
            self.play_sound(ctx);
        }
    }

    fn save_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
