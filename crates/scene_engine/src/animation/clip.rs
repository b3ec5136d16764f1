//! Animation clips: nine transform channels evaluated together

use serde::{Deserialize, Serialize};

use super::curve::AnimationCurve;
use crate::foundation::math::Vec3;

/// Transform channel driven by one curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Position X
    PosX,
    /// Position Y
    PosY,
    /// Position Z
    PosZ,
    /// Rotation X (radians)
    RotX,
    /// Rotation Y (radians)
    RotY,
    /// Rotation Z (radians)
    RotZ,
    /// Scale X
    ScaleX,
    /// Scale Y
    ScaleY,
    /// Scale Z
    ScaleZ,
}

impl Channel {
    /// All channels in storage order
    pub const ALL: [Self; 9] = [
        Self::PosX,
        Self::PosY,
        Self::PosZ,
        Self::RotX,
        Self::RotY,
        Self::RotZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Value used when the channel has no keyframes
    pub const fn rest_value(self) -> f32 {
        match self {
            Self::ScaleX | Self::ScaleY | Self::ScaleZ => 1.0,
            _ => 0.0,
        }
    }

    /// Curve name for this channel
    pub const fn curve_name(self) -> &'static str {
        match self {
            Self::PosX => "posX",
            Self::PosY => "posY",
            Self::PosZ => "posZ",
            Self::RotX => "rotX",
            Self::RotY => "rotY",
            Self::RotZ => "rotZ",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::ScaleZ => "scaleZ",
        }
    }
}

/// Evaluated transform contribution of a clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSample {
    /// Position
    pub position: Vec3,
    /// Rotation, radians
    pub rotation: Vec3,
    /// Scale
    pub scale: Vec3,
}

impl Default for TransformSample {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Named bundle of per-channel curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    curves: [AnimationCurve; 9],
    looping: bool,
}

impl Default for AnimationClip {
    fn default() -> Self {
        Self::new("")
    }
}

impl AnimationClip {
    /// Create a looping clip with nine empty curves
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curves: Channel::ALL.map(|channel| AnimationCurve::new(channel.curve_name())),
            looping: true,
        }
    }

    /// Curve driving a channel
    pub fn curve(&self, channel: Channel) -> &AnimationCurve {
        &self.curves[channel.index()]
    }

    /// Mutable curve driving a channel
    pub fn curve_mut(&mut self, channel: Channel) -> &mut AnimationCurve {
        &mut self.curves[channel.index()]
    }

    /// Add a keyframe to one channel
    pub fn add_keyframe(&mut self, channel: Channel, time: f32, value: f32) {
        self.curve_mut(channel).add_keyframe(time, value);
    }

    /// Builder pattern: add a keyframe
    pub fn with_keyframe(mut self, channel: Channel, time: f32, value: f32) -> Self {
        self.add_keyframe(channel, time, value);
        self
    }

    /// Whether playback wraps at the end
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Set looping on the clip and every curve in it
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        for curve in &mut self.curves {
            curve.looping = looping;
        }
    }

    /// Builder pattern: set looping
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.set_looping(looping);
        self
    }

    /// Largest keyframe time across all channels
    pub fn duration(&self) -> f32 {
        self.curves.iter().map(AnimationCurve::duration).fold(0.0, f32::max)
    }

    /// Evaluate one channel, falling back to its rest value when empty
    pub fn evaluate_channel(&self, channel: Channel, time: f32) -> f32 {
        let curve = self.curve(channel);
        if curve.keyframes().is_empty() {
            channel.rest_value()
        } else {
            curve.evaluate(time)
        }
    }

    /// Evaluate every channel at `time`
    pub fn evaluate(&self, time: f32) -> TransformSample {
        let v = |x, y, z| {
            Vec3::new(
                self.evaluate_channel(x, time),
                self.evaluate_channel(y, time),
                self.evaluate_channel(z, time),
            )
        };
        TransformSample {
            position: v(Channel::PosX, Channel::PosY, Channel::PosZ),
            rotation: v(Channel::RotX, Channel::RotY, Channel::RotZ),
            scale: v(Channel::ScaleX, Channel::ScaleY, Channel::ScaleZ),
        }
    }
}
