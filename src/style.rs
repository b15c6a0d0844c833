use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Per-point alpha mask applied to each sprite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlphaMask {
    /// Round sprite whose alpha falls off over the outer `feather` fraction of its radius.
    SoftCircle { feather: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// World units when attenuated, logical pixels otherwise.
    pub size: f32,
    pub size_attenuation: bool,
    pub vertex_colors: bool,
    /// Used for every point when `vertex_colors` is off.
    pub color: [f32; 3],
    pub alpha_mask: Option<AlphaMask>,
    pub transparent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            size: 0.1,
            size_attenuation: true,
            vertex_colors: true,
            color: [1.0, 1.0, 1.0],
            alpha_mask: None,
            transparent: false,
            depth_test: true,
            depth_write: true,
            blending: Blending::Normal,
        }
    }
}

/// The subset of a style that is baked into a GPU pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub transparent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl RenderStyle {
    /// Soft additive sprites drawn on top of everything else.
    pub fn glow(size: f32) -> Self {
        Self {
            size,
            alpha_mask: Some(AlphaMask::SoftCircle { feather: 0.5 }),
            transparent: true,
            depth_test: false,
            depth_write: false,
            blending: Blending::Additive,
            ..Self::default()
        }
    }

    pub fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            transparent: self.transparent,
            depth_test: self.depth_test,
            depth_write: self.depth_write && self.depth_test,
            blending: self.blending,
        }
    }

    pub fn is_valid(&self) -> bool {
        let mask_ok = match self.alpha_mask {
            Some(AlphaMask::SoftCircle { feather }) => (0.0..=1.0).contains(&feather),
            None => true,
        };
        self.size.is_finite()
            && self.size > 0.0
            && self.color.iter().all(|c| (0.0..=1.0).contains(c))
            && mask_ok
    }
}
