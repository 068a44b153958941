//! Frame timing

use std::time::Instant;

/// Timing information for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick
    pub delta: f32,
    /// Seconds since the clock was created
    pub total: f32,
    /// Number of ticks so far, starting at 1 for the first frame
    pub frame: u64,
    /// Exponentially smoothed frames per second
    pub fps: f32,
}

/// Frame clock measuring delta time and a smoothed frame rate
///
/// The smoothed rate is what the stats overlay shows; it settles over
/// roughly a second of frames instead of jittering every frame.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    total: f32,
    frame: u64,
    smoothed_fps: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    const SMOOTHING: f32 = 0.05;

    /// Create a clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            total: 0.0,
            frame: 0,
            smoothed_fps: 0.0,
        }
    }

    /// Advance the clock by the real time elapsed since the previous tick
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.advance(delta)
    }

    /// Advance the clock by a fixed amount of time
    pub fn advance(&mut self, delta: f32) -> FrameTime {
        let delta = delta.max(0.0);
        self.total += delta;
        self.frame += 1;

        if delta > 0.0 {
            let instant_fps = 1.0 / delta;
            self.smoothed_fps = if self.smoothed_fps == 0.0 {
                instant_fps
            } else {
                self.smoothed_fps + (instant_fps - self.smoothed_fps) * Self::SMOOTHING
            };
        }

        FrameTime {
            delta,
            total: self.total,
            frame: self.frame,
            fps: self.smoothed_fps,
        }
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Total elapsed time in seconds
    pub fn total_time(&self) -> f32 {
        self.total
    }

    /// Smoothed frames per second
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        let time = clock.advance(0.25);

        assert_eq!(time.frame, 2);
        assert_relative_eq!(time.delta, 0.25);
        assert_relative_eq!(time.total, 0.75);
    }

    #[test]
    fn test_fps_seeds_from_first_frame_then_smooths() {
        let mut clock = FrameClock::new();
        assert_relative_eq!(clock.advance(0.01).fps, 100.0, epsilon = 1e-3);

        let smoothed = clock.advance(0.02).fps;
        assert!(smoothed < 100.0 && smoothed > 50.0);
    }

    #[test]
    fn test_negative_delta_clamped() {
        let mut clock = FrameClock::new();
        let time = clock.advance(-1.0);
        assert_relative_eq!(time.delta, 0.0);
        assert_relative_eq!(clock.fps(), 0.0);
    }
}
