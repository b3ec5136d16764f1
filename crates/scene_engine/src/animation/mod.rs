//! Keyframe animation
//!
//! Curves hold sorted scalar keyframes, clips bundle nine curves into a
//! transform, and a controller on each entity plays one clip at a time.

pub mod clip;
pub mod controller;
pub mod curve;

pub use clip::{AnimationClip, Channel, TransformSample};
pub use controller::AnimationController;
pub use curve::{AnimationCurve, Keyframe};
