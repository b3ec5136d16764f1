//! Time management utilities

use std::time::{Duration, Instant};

/// Wall-clock frame timer used by the frame driver
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the time since the previous call and return it in seconds
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Restart measurement from now without counting the gap as a frame
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.delta_time = 0.0;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time left until `interval` has passed since the last measured frame
    pub fn remaining_in_frame(&self, interval: Duration) -> Duration {
        interval.saturating_sub(self.last_frame.elapsed())
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Fixed-step accumulator for deterministic stepping
#[derive(Debug, Clone)]
pub struct StepAccumulator {
    step: f32,
    max_substeps: u32,
    accumulated: f32,
}

impl StepAccumulator {
    /// Create an accumulator producing steps of `step` seconds
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_substeps: max_substeps.max(1),
            accumulated: 0.0,
        }
    }

    /// Size of one step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed elapsed time and return how many whole steps to run.
    ///
    /// Time beyond `max_substeps` steps is dropped so a long stall cannot
    /// snowball into ever longer frames.
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        self.accumulated += delta_time.max(0.0);
        let mut steps = 0;
        while self.accumulated >= self.step && steps < self.max_substeps {
            self.accumulated -= self.step;
            steps += 1;
        }
        if steps == self.max_substeps && self.accumulated >= self.step {
            log::warn!(
                "Fixed-step accumulator saturated at {} substeps, dropping {:.4}s",
                self.max_substeps,
                self.accumulated
            );
            self.accumulated = 0.0;
        }
        steps
    }

    /// Leftover time not yet consumed by a step
    pub fn remainder(&self) -> f32 {
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_whole_steps() {
        let mut acc = StepAccumulator::new(0.25, 8);
        assert_eq!(acc.advance(0.6), 2);
        assert!((acc.remainder() - 0.1).abs() < 1e-6);
        assert_eq!(acc.advance(0.2), 1);
    }

    #[test]
    fn test_accumulator_caps_substeps() {
        let mut acc = StepAccumulator::new(0.1, 3);
        assert_eq!(acc.advance(10.0), 3);
        assert_eq!(acc.remainder(), 0.0);
    }

    #[test]
    fn test_accumulator_ignores_negative_delta() {
        let mut acc = StepAccumulator::new(0.1, 3);
        assert_eq!(acc.advance(-1.0), 0);
        assert_eq!(acc.remainder(), 0.0);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= 0.0);
    }
}
