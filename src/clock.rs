//! Animation time.

use std::time::{Duration, Instant};

/// Monotonic elapsed time, advanced explicitly by the frame loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockState {
    elapsed: f64,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the clock was started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Negative and non-finite deltas are dropped so elapsed time never decreases.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Measures wall-clock time between host frames.
#[derive(Debug)]
pub struct FrameTimer {
    last_frame_time: Instant,
    last_frame: Duration,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last_frame_time: Instant::now(),
            last_frame: Duration::ZERO,
        }
    }

    /// Returns the time since the previous call (or since construction).
    pub fn lap(&mut self) -> Duration {
        let current_time = Instant::now();
        self.last_frame = current_time.duration_since(self.last_frame_time);
        self.last_frame_time = current_time;
        self.last_frame
    }

    pub fn last_frame(&self) -> Duration {
        self.last_frame
    }
}
