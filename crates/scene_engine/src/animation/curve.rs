//! Keyframed scalar curves

use serde::{Deserialize, Serialize};

use crate::foundation::math::utils::lerp;

/// A single (time, value) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds
    pub time: f32,
    /// Sampled value
    pub value: f32,
}

/// Linearly interpolated curve, kept sorted by time after every insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationCurve {
    /// Channel label
    pub name: String,
    #[serde(deserialize_with = "sorted_keyframes")]
    keyframes: Vec<Keyframe>,
    /// Wrap time past the last keyframe back into the curve
    pub looping: bool,
}

fn sorted_keyframes<'de, D>(deserializer: D) -> Result<Vec<Keyframe>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut keyframes = Vec::<Keyframe>::deserialize(deserializer)?;
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(keyframes)
}

impl Default for AnimationCurve {
    fn default() -> Self {
        Self {
            name: String::new(),
            keyframes: Vec::new(),
            looping: true,
        }
    }
}

impl AnimationCurve {
    /// Create an empty looping curve
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Insert a keyframe, keeping the list ordered by time
    pub fn add_keyframe(&mut self, time: f32, value: f32) {
        self.keyframes.push(Keyframe { time, value });
        // Stable sort keeps insertion order among equal times
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Builder pattern: add a keyframe
    pub fn with_keyframe(mut self, time: f32, value: f32) -> Self {
        self.add_keyframe(time, value);
        self
    }

    /// Builder pattern: set looping
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Remove every keyframe
    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Time of the last keyframe, or zero for an empty curve
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Sample the curve at `time`
    pub fn evaluate(&self, time: f32) -> f32 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if self.keyframes.len() == 1 {
            return first.value;
        }

        let duration = last.time;
        let t = if duration <= 0.0 {
            time
        } else if self.looping {
            time.rem_euclid(duration)
        } else {
            time.min(duration)
        };

        if t <= first.time {
            return first.value;
        }

        self.keyframes
            .windows(2)
            .find(|pair| pair[0].time <= t && t <= pair[1].time)
            .map_or(last.value, |pair| {
                let (k1, k2) = (pair[0], pair[1]);
                let span = k2.time - k1.time;
                if span <= 0.0 {
                    k2.value
                } else {
                    lerp(k1.value, k2.value, (t - k1.time) / span)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(looping: bool) -> AnimationCurve {
        AnimationCurve::new("ramp")
            .with_keyframe(0.0, 0.0)
            .with_keyframe(2.0, 10.0)
            .with_looping(looping)
    }

    #[test]
    fn test_empty_and_single_keyframe() {
        let mut curve = AnimationCurve::new("x");
        assert_eq!(curve.evaluate(1.0), 0.0);

        curve.add_keyframe(3.0, 7.5);
        assert_eq!(curve.evaluate(0.0), 7.5);
        assert_eq!(curve.evaluate(100.0), 7.5);
    }

    #[test]
    fn test_non_looping_interpolates_and_clamps() {
        let curve = ramp(false);
        assert_relative_eq!(curve.evaluate(0.0), 0.0);
        assert_relative_eq!(curve.evaluate(1.0), 5.0);
        assert_relative_eq!(curve.evaluate(3.0), 10.0);
    }

    #[test]
    fn test_looping_wraps_by_last_keyframe_time() {
        let curve = ramp(true);
        assert_relative_eq!(curve.evaluate(2.5), curve.evaluate(0.5));
        assert_relative_eq!(curve.evaluate(2.5), 2.5);
    }

    #[test]
    fn test_insertion_keeps_keyframes_sorted() {
        let curve = AnimationCurve::new("y")
            .with_keyframe(2.0, 1.0)
            .with_keyframe(0.5, 3.0)
            .with_keyframe(1.0, 2.0);

        let times: Vec<f32> = curve.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.5, 1.0, 2.0]);
        assert_eq!(curve.duration(), 2.0);
    }

    #[test]
    fn test_time_before_first_keyframe_holds_first_value() {
        let curve = AnimationCurve::new("z")
            .with_keyframe(1.0, 4.0)
            .with_keyframe(2.0, 8.0)
            .with_looping(false);
        assert_eq!(curve.evaluate(0.25), 4.0);
        assert_eq!(curve.evaluate(-1.0), 4.0);
    }

    #[test]
    fn test_coincident_keyframes_do_not_divide_by_zero() {
        let curve = AnimationCurve::new("step")
            .with_keyframe(0.0, 0.0)
            .with_keyframe(1.0, 1.0)
            .with_keyframe(1.0, 5.0)
            .with_keyframe(2.0, 5.0)
            .with_looping(false);

        let value = curve.evaluate(1.0);
        assert!(value.is_finite());
        assert_relative_eq!(curve.evaluate(1.5), 5.0);
    }

    #[test]
    fn test_deserialized_keyframes_are_sorted() {
        let json = r#"{"name":"x","keyframes":[{"time":2.0,"value":1.0},{"time":0.0,"value":0.0}],"looping":false}"#;
        let curve: AnimationCurve = serde_json::from_str(json).unwrap();
        assert_eq!(curve.keyframes()[0].time, 0.0);
        assert_relative_eq!(curve.evaluate(1.0), 0.5);
    }

    #[test]
    fn test_all_keyframes_at_zero() {
        let curve = AnimationCurve::new("flat").with_keyframe(0.0, 1.0).with_keyframe(0.0, 2.0);
        assert!(curve.evaluate(0.7).is_finite());
    }
}
