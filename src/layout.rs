//! GPU-side layouts of the frame uniform and the point attribute buffers.
//!
//! Must stay in sync with `shaders/points.wgsl`.

use encase::{ArrayLength, ShaderType, StorageBuffer, UniformBuffer};

use crate::error::{Error, Result};
use crate::field::ATTRIBUTE_STRIDE;
use crate::renderable::Renderable;
use crate::scene::Scene;
use crate::style::AlphaMask;
use crate::viewport::SurfaceSize;

pub const FLAG_SIZE_ATTENUATION: u32 = 1;
pub const FLAG_VERTEX_COLORS: u32 = 1 << 1;
pub const FLAG_ALPHA_MASK: u32 = 1 << 2;

#[derive(ShaderType)]
pub struct GpuFrame {
    pub view_matrix: cgmath::Matrix4<f32>,
    pub projection_matrix: cgmath::Matrix4<f32>,
    pub model_matrix: cgmath::Matrix4<f32>,
    /// Physical surface size in pixels.
    pub viewport: cgmath::Vector2<f32>,
    pub point_size: f32,
    pub pixel_ratio: f32,
    pub color: cgmath::Vector3<f32>,
    pub flags: u32,
    pub mask_feather: f32,
}

#[derive(ShaderType)]
pub struct GpuPoints<'a> {
    pub length: ArrayLength,
    #[size(runtime)]
    pub points: &'a [cgmath::Vector3<f32>],
}

impl GpuFrame {
    pub fn new(scene: &Scene, surface: SurfaceSize) -> Self {
        let camera = scene.camera();
        let renderable = scene.renderable();
        let style = renderable.style();

        let mut flags = 0;
        if style.size_attenuation {
            flags |= FLAG_SIZE_ATTENUATION;
        }
        if style.vertex_colors {
            flags |= FLAG_VERTEX_COLORS;
        }
        let mask_feather = match style.alpha_mask {
            Some(AlphaMask::SoftCircle { feather }) => {
                flags |= FLAG_ALPHA_MASK;
                feather
            }
            None => 0.0,
        };
        let [r, g, b] = style.color;

        Self {
            view_matrix: camera.view_matrix(),
            projection_matrix: camera.projection_matrix(),
            model_matrix: renderable.model_matrix(),
            viewport: cgmath::vec2(
                surface.physical_width as f32,
                surface.physical_height as f32,
            ),
            point_size: style.size,
            pixel_ratio: surface.pixel_ratio,
            color: cgmath::vec3(r, g, b),
            flags,
            mask_feather,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = UniformBuffer::new(Vec::new());
        buffer
            .write(self)
            .map_err(|e| Error::Layout(format!("frame uniform: {e:?}")))?;
        Ok(buffer.into_inner())
    }
}

/// Packs a flat xyz buffer into the storage layout (`length`, then 16-byte aligned vec3s).
pub fn pack_points(values: &[f32]) -> Result<Vec<u8>> {
    let points: Vec<cgmath::Vector3<f32>> = values
        .chunks_exact(ATTRIBUTE_STRIDE)
        .map(|v| cgmath::vec3(v[0], v[1], v[2]))
        .collect();

    let mut storage = StorageBuffer::new(Vec::new());
    storage
        .write(&GpuPoints {
            length: ArrayLength,
            points: &points,
        })
        .map_err(|e| Error::Layout(format!("point buffer: {e:?}")))?;
    Ok(storage.into_inner())
}

/// Position and color storage buffers for a renderable, packed concurrently.
pub struct PointUpload {
    pub revision: u64,
    pub count: u32,
    pub positions: Vec<u8>,
    pub colors: Vec<u8>,
}

impl PointUpload {
    pub fn new(renderable: &Renderable) -> Result<Self> {
        let count = u32::try_from(renderable.point_count()).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} points exceed the GPU instance limit",
                renderable.point_count()
            ))
        })?;
        let (positions, colors) = rayon::join(
            || pack_points(renderable.positions()),
            || pack_points(renderable.colors()),
        );
        Ok(Self {
            revision: renderable.revision(),
            count,
            positions: positions?,
            colors: colors?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_frame_uniform_size() {
        assert_eq!(<GpuFrame as ShaderType>::min_size().get(), 240);
    }

    #[test]
    fn test_pack_points_layout() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let bytes = pack_points(&values).unwrap();

        assert_eq!(bytes.len(), 16 + 2 * 16);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 2);
        assert_eq!(read_f32(&bytes, 16), 1.0);
        assert_eq!(read_f32(&bytes, 24), 3.0);
        assert_eq!(read_f32(&bytes, 32), 4.0);
        assert_eq!(read_f32(&bytes, 40), 6.0);
    }
}
