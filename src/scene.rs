use rand::Rng;
use tracing::info;

use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::driver::Presenter;
use crate::error::Result;
use crate::field::{ParticleField, SamplingPolicy};
use crate::renderable::{Renderable, assemble};
use crate::viewport::{SurfaceSize, Viewport};

/// Everything a frame needs: the display surface, the camera and the point cloud.
pub struct Scene {
    viewport: Viewport,
    camera: PerspectiveCamera,
    renderable: Renderable,
}

impl Scene {
    pub fn new(config: &SceneConfig, viewport: Viewport) -> Result<Self> {
        config.validate()?;
        let field = ParticleField::generate(config.particle_count, config.sampling)?;
        Self::from_field(config, viewport, field)
    }

    /// Like [`Scene::new`] but draws the field from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: &SceneConfig, viewport: Viewport, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let field = ParticleField::generate_with(config.particle_count, config.sampling, rng)?;
        Self::from_field(config, viewport, field)
    }

    fn from_field(config: &SceneConfig, viewport: Viewport, field: ParticleField) -> Result<Self> {
        let viewport = viewport.with_max_pixel_ratio(config.max_pixel_ratio);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let renderable = assemble(field, config.style.clone())?;
        Ok(Self::from_parts(viewport, camera, renderable))
    }

    pub fn from_parts(viewport: Viewport, camera: PerspectiveCamera, renderable: Renderable) -> Self {
        let mut scene = Self {
            viewport,
            camera,
            renderable,
        };
        scene.sync_camera();
        scene
    }

    /// Applies a display resize to the viewport, camera and presenter surface in one step.
    pub fn resize<P: Presenter + ?Sized>(&mut self, width: i32, height: i32, presenter: &mut P) -> SurfaceSize {
        let surface = self.viewport.on_resize(width, height);
        self.sync_camera();
        presenter.resize_surface(surface);
        surface
    }

    /// Updates the device pixel ratio; the surface is resized if the capped ratio changed.
    pub fn set_device_pixel_ratio<P: Presenter + ?Sized>(&mut self, ratio: f32, presenter: &mut P) {
        let before = self.viewport.pixel_ratio();
        self.viewport.set_device_pixel_ratio(ratio);
        if self.viewport.pixel_ratio() != before {
            presenter.resize_surface(self.viewport.surface_size());
        }
    }

    /// Replaces both attribute buffers with a freshly generated field.
    pub fn regenerate(&mut self, count: usize, policy: SamplingPolicy) -> Result<()> {
        let field = ParticleField::generate(count, policy)?;
        info!(count, "Regenerated particle field");
        self.renderable.replace_field(field);
        Ok(())
    }

    fn sync_camera(&mut self) {
        self.camera.set_aspect(self.viewport.aspect());
        self.camera.update_projection_matrix();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn renderable(&self) -> &Renderable {
        &self.renderable
    }

    pub fn renderable_mut(&mut self) -> &mut Renderable {
        &mut self.renderable
    }
}
