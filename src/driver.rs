//! Per-frame animation loop.
//!
//! The host owns the loop and calls [`FrameDriver::tick`] once per display
//! refresh; the driver never blocks or schedules anything itself.

use tracing::{debug, info};

use crate::clock::ClockState;
use crate::error::Result;
use crate::scene::Scene;
use crate::viewport::SurfaceSize;

/// Rotation rate about the vertical axis, in radians per second.
pub const DEFAULT_ROTATION_RATE: f32 = 0.1;

/// The external renderer a frame is handed to.
pub trait Presenter {
    fn resize_surface(&mut self, surface: SurfaceSize);

    /// Draws the current scene. Errors are fatal to the session and are not retried.
    fn present(&mut self, scene: &Scene) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    clock: ClockState,
    rotation_rate: f32,
    frames: u64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_RATE)
    }
}

impl FrameDriver {
    pub fn new(rotation_rate: f32) -> Self {
        Self {
            state: DriverState::Idle,
            clock: ClockState::new(),
            rotation_rate,
            frames: 0,
        }
    }

    /// Idle -> Running; the clock starts from zero. Has no effect once running.
    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            self.clock.reset();
            self.state = DriverState::Running;
            info!(rotation_rate = self.rotation_rate, "Frame driver started");
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn rotation_rate(&self) -> f32 {
        self.rotation_rate
    }

    pub fn set_rotation_rate(&mut self, rotation_rate: f32) {
        self.rotation_rate = rotation_rate;
    }

    /// Rotation about the vertical axis at the current time, not wrapped to 2π.
    pub fn rotation_angle(&self) -> f32 {
        (self.rotation_rate as f64 * self.clock.elapsed()) as f32
    }

    /// Advances one frame.
    ///
    /// The first tick on an idle driver starts it at `t = 0` and ignores `dt`.
    pub fn tick<P: Presenter + ?Sized>(&mut self, scene: &mut Scene, dt: f64, presenter: &mut P) -> Result<()> {
        if self.state == DriverState::Idle {
            self.start();
        } else {
            self.clock.advance(dt);
        }

        let angle = self.rotation_angle();
        scene.renderable_mut().transform.rotation.y = cgmath::Rad(angle);

        presenter.present(scene)?;
        self.frames += 1;

        if self.frames % 600 == 0 {
            debug!(frames = self.frames, elapsed = self.clock.elapsed(), angle, "Frame driver progress");
        }
        Ok(())
    }
}
