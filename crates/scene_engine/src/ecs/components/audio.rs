//! Audio source component
//!
//! Holds playback state only; decoding and mixing belong to the host.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentSlots};

/// Sound emitter attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioSource {
    /// Clip name resolved by the host
    pub clip: Option<String>,
    /// Volume in `[0, 1]`
    pub volume: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Restart when finished
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Positional audio from the entity's world position
    pub is_3d: bool,
    /// Whether the host should be playing the clip
    pub is_playing: bool,
    /// Whether the component is active
    pub enabled: bool,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            clip: None,
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            is_3d: true,
            is_playing: false,
            enabled: true,
        }
    }
}

impl AudioSource {
    /// Source for a named clip
    pub fn with_clip(clip: impl Into<String>) -> Self {
        Self {
            clip: Some(clip.into()),
            ..Default::default()
        }
    }

    /// Request playback; ignored without a clip
    pub fn play(&mut self) {
        self.is_playing = self.clip.is_some();
    }

    /// Request stop
    pub fn stop(&mut self) {
        self.is_playing = false;
    }

    /// Set volume, clamped into `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

impl Component for AudioSource {
    const KIND: ComponentKind = ComponentKind::AudioSource;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.audio.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.audio
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_requires_clip() {
        let mut silent = AudioSource::default();
        silent.play();
        assert!(!silent.is_playing);

        let mut music = AudioSource::with_clip("theme");
        music.play();
        assert!(music.is_playing);
        music.stop();
        assert!(!music.is_playing);
    }

    #[test]
    fn test_volume_clamped() {
        let mut source = AudioSource::default();
        source.set_volume(3.0);
        assert_eq!(source.volume, 1.0);
    }

    #[test]
    fn test_loop_key_name() {
        let source: AudioSource = serde_json::from_str(r#"{"clip": "wind", "loop": true}"#).unwrap();
        assert!(source.looping);
        assert_eq!(source.pitch, 1.0);
    }
}
