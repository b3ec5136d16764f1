//! Per-entity clip playback

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::clip::{AnimationClip, TransformSample};

/// Plays one named clip at a time and reports the sampled transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationController {
    clips: BTreeMap<String, AnimationClip>,
    current: Option<String>,
    time: f32,
    playing: bool,
    /// Playback speed multiplier
    pub speed: f32,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self {
            clips: BTreeMap::new(),
            current: None,
            time: 0.0,
            playing: false,
            speed: 1.0,
        }
    }
}

impl AnimationController {
    /// Create a controller with no clips
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip under its name, replacing any clip with the same name
    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Remove a clip; stops playback if it was the current one
    pub fn remove_clip(&mut self, name: &str) -> Option<AnimationClip> {
        if self.current.as_deref() == Some(name) {
            self.current = None;
            self.stop();
        }
        self.clips.remove(name)
    }

    /// Registered clip by name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    /// Names of all registered clips
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Start a clip from time zero. Returns false if no clip has that name.
    pub fn play(&mut self, name: &str) -> bool {
        if !self.clips.contains_key(name) {
            log::warn!("Animation clip '{name}' not found");
            return false;
        }
        log::debug!("Playing animation clip '{name}'");
        self.current = Some(name.to_owned());
        self.time = 0.0;
        self.playing = true;
        true
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    /// Halt without rewinding
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Continue the current clip from where it paused
    pub fn resume(&mut self) {
        self.playing = self.current.is_some();
    }

    /// Whether a clip is advancing
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Name of the current clip
    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Playback time within the current clip
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Advance playback and return the sampled transform, if playing.
    ///
    /// Crossing the clip's duration wraps time to zero for looping clips and
    /// stops playback otherwise.
    pub fn update(&mut self, delta_time: f32) -> Option<TransformSample> {
        if !self.playing {
            return None;
        }
        let Some(clip) = self.current.as_ref().and_then(|name| self.clips.get(name)) else {
            self.playing = false;
            return None;
        };

        self.time += delta_time * self.speed;
        let sample = clip.evaluate(self.time);

        if self.time > clip.duration() {
            if clip.is_looping() {
                self.time = 0.0;
            } else {
                self.playing = false;
                log::trace!("Animation clip '{}' finished", clip.name);
            }
        }

        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::Channel;
    use approx::assert_relative_eq;

    fn rise(looping: bool) -> AnimationClip {
        AnimationClip::new("rise")
            .with_keyframe(Channel::PosY, 0.0, 0.0)
            .with_keyframe(Channel::PosY, 1.0, 10.0)
            .with_looping(looping)
    }

    #[test]
    fn test_play_unknown_clip_fails() {
        let mut controller = AnimationController::new();
        assert!(!controller.play("missing"));
        assert!(!controller.is_playing());
        assert!(controller.update(0.1).is_none());
    }

    #[test]
    fn test_update_samples_clip() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(true));
        assert!(controller.play("rise"));

        let sample = controller.update(0.5).unwrap();
        assert_relative_eq!(sample.position.y, 5.0);
        assert_relative_eq!(controller.time(), 0.5);
    }

    #[test]
    fn test_speed_scales_time() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(true));
        controller.speed = 0.5;
        controller.play("rise");

        controller.update(0.5);
        assert_relative_eq!(controller.time(), 0.25);
    }

    #[test]
    fn test_looping_clip_wraps_to_zero() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(true));
        controller.play("rise");

        controller.update(1.2);
        assert!(controller.is_playing());
        assert_eq!(controller.time(), 0.0);
    }

    #[test]
    fn test_non_looping_clip_stops_at_end() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(false));
        controller.play("rise");

        let sample = controller.update(1.5).unwrap();
        assert_relative_eq!(sample.position.y, 10.0);
        assert!(!controller.is_playing());
        assert!(controller.update(0.1).is_none());
    }

    #[test]
    fn test_stop_rewinds_and_pause_does_not() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(true));
        controller.play("rise");
        controller.update(0.3);

        controller.pause();
        assert_relative_eq!(controller.time(), 0.3);
        controller.resume();
        assert!(controller.is_playing());

        controller.stop();
        assert_eq!(controller.time(), 0.0);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_removing_current_clip_stops_playback() {
        let mut controller = AnimationController::new();
        controller.add_clip(rise(true));
        controller.play("rise");

        assert!(controller.remove_clip("rise").is_some());
        assert!(!controller.is_playing());
        assert!(controller.current_clip().is_none());
    }
}
