//! Point-cloud renderable: uploaded attribute buffers, a style and a transform.

use cgmath::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::field::{ATTRIBUTE_STRIDE, ParticleField};
use crate::style::RenderStyle;

/// Whole-object transform, applied on the GPU without touching the buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Euler<cgmath::Rad<f32>>,
    pub scale: cgmath::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: cgmath::Vector3::zero(),
            rotation: cgmath::Euler::new(cgmath::Rad(0.0), cgmath::Rad(0.0), cgmath::Rad(0.0)),
            scale: cgmath::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[derive(Clone, Debug)]
pub struct Renderable {
    field: ParticleField,
    style: RenderStyle,
    pub transform: Transform,
    revision: u64,
}

/// Binds a generated field to a render style.
pub fn assemble(field: ParticleField, style: RenderStyle) -> Result<Renderable> {
    if !style.is_valid() {
        return Err(Error::InvalidArgument(format!("invalid render style: {style:?}")));
    }
    info!(count = field.count(), ?style, "Assembled point cloud");
    Ok(Renderable {
        field,
        style,
        transform: Transform::default(),
        revision: 0,
    })
}

impl Renderable {
    pub fn point_count(&self) -> usize {
        self.field.count()
    }

    pub fn positions(&self) -> &[f32] {
        self.field.positions()
    }

    pub fn colors(&self) -> &[f32] {
        self.field.colors()
    }

    pub fn attribute_stride(&self) -> usize {
        ATTRIBUTE_STRIDE
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Style changes never require a buffer upload.
    pub fn set_style(&mut self, style: RenderStyle) -> Result<()> {
        if !style.is_valid() {
            return Err(Error::InvalidArgument(format!("invalid render style: {style:?}")));
        }
        self.style = style;
        Ok(())
    }

    /// Bumped whenever the buffers are replaced; presenters upload when it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swaps in a freshly generated field, keeping style and transform.
    pub fn replace_field(&mut self, field: ParticleField) {
        info!(
            old = self.field.count(),
            new = field.count(),
            "Replacing point cloud buffers"
        );
        self.field = field;
        self.revision += 1;
    }

    pub fn model_matrix(&self) -> cgmath::Matrix4<f32> {
        self.transform.matrix()
    }
}
