//! Real-time GPU particle field.
//!
//! Generates a colored point cloud from a [`SamplingPolicy`], packages it as a
//! [`Renderable`] and animates it with a [`FrameDriver`] that hands each frame
//! to a [`Presenter`]. The `viewer` feature adds an eframe/wgpu window.

pub mod camera;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod layout;
pub mod renderable;
pub mod scene;
pub mod style;
pub mod viewport;

#[cfg(feature = "viewer")]
pub mod gpu;
#[cfg(feature = "viewer")]
pub mod panel;

pub use camera::{CameraConfig, PerspectiveCamera};
pub use clock::{ClockState, FrameTimer};
pub use config::{Preset, SceneConfig};
pub use driver::{DEFAULT_ROTATION_RATE, DriverState, FrameDriver, Presenter};
pub use error::{Error, Result};
pub use field::{ATTRIBUTE_STRIDE, ParticleField, SamplingPolicy};
pub use layout::{GpuFrame, PointUpload};
pub use renderable::{Renderable, Transform, assemble};
pub use scene::Scene;
pub use style::{AlphaMask, Blending, RenderStyle};
pub use viewport::{MAX_PIXEL_RATIO, SurfaceSize, Viewport};
