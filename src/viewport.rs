//! Display surface dimensions and the projection parameters derived from them.

use tracing::{debug, warn};

/// Upper bound applied to the device pixel ratio when sizing the draw surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Size of the draw surface after the pixel-ratio cap has been applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub physical_width: u32,
    pub physical_height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
    max_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1, 1.0)
    }
}

impl Viewport {
    pub fn new(width: i32, height: i32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            device_pixel_ratio: 1.0,
            max_pixel_ratio: MAX_PIXEL_RATIO,
        };
        viewport.set_device_pixel_ratio(device_pixel_ratio);
        viewport.on_resize(width, height);
        viewport
    }

    pub fn with_max_pixel_ratio(mut self, max_pixel_ratio: f32) -> Self {
        if max_pixel_ratio.is_finite() && max_pixel_ratio > 0.0 {
            self.max_pixel_ratio = max_pixel_ratio;
        }
        self
    }

    pub fn current_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Stores a new size and returns the resulting surface.
    ///
    /// Zero or negative dimensions are clamped to 1 so the aspect ratio stays defined.
    pub fn on_resize(&mut self, width: i32, height: i32) -> SurfaceSize {
        if width < 1 || height < 1 {
            warn!(width, height, "Clamping malformed viewport size");
        }
        self.width = width.max(1) as u32;
        self.height = height.max(1) as u32;

        let surface = self.surface_size();
        debug!(?surface, aspect = self.aspect(), "Viewport resized");
        surface
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Device pixel ratio capped at the configured maximum.
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let pixel_ratio = self.pixel_ratio();
        let scale = |v: u32| ((v as f32 * pixel_ratio).round() as u32).max(1);
        SurfaceSize {
            width: self.width,
            height: self.height,
            pixel_ratio,
            physical_width: scale(self.width),
            physical_height: scale(self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aspect_follows_resize() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!((viewport.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);

        viewport.on_resize(1920, 1080);
        assert_eq!(viewport.current_size(), (1920, 1080));
        assert!((viewport.aspect() - 1920.0 / 1080.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let viewport = Viewport::new(100, 50, 3.0);
        assert_eq!(viewport.device_pixel_ratio(), 3.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);

        let surface = viewport.surface_size();
        assert_eq!(surface.physical_width, 200);
        assert_eq!(surface.physical_height, 100);
    }

    #[test]
    fn test_bad_pixel_ratio_falls_back() {
        let mut viewport = Viewport::new(10, 10, 1.5);
        viewport.set_device_pixel_ratio(f32::NAN);
        assert_eq!(viewport.pixel_ratio(), 1.0);
        viewport.set_device_pixel_ratio(-2.0);
        assert_eq!(viewport.pixel_ratio(), 1.0);
    }

    #[test]
    fn test_custom_cap() {
        let viewport = Viewport::new(10, 10, 3.0).with_max_pixel_ratio(1.0);
        assert_eq!(viewport.pixel_ratio(), 1.0);
    }

    #[test]
    fn test_negative_size_clamped() {
        let mut viewport = Viewport::default();
        let surface = viewport.on_resize(-20, 300);
        assert_eq!((surface.width, surface.height), (1, 300));
    }
}
