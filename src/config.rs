//! Scene configuration, loadable from YAML.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```yaml
//! particle_count: 100000
//! sampling:
//!   kind: annular_disc
//!   r_min: 10.0
//!   r_max: 12.0
//!   height: 2.0
//! style:
//!   size: 0.05
//! rotation_rate: 0.2
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::CameraConfig;
use crate::driver::DEFAULT_ROTATION_RATE;
use crate::error::{Error, Result};
use crate::field::SamplingPolicy;
use crate::style::RenderStyle;
use crate::viewport::MAX_PIXEL_RATIO;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: usize,
    pub sampling: SamplingPolicy,
    pub style: RenderStyle,
    pub camera: CameraConfig,
    pub rotation_rate: f32,
    pub max_pixel_ratio: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::preset(Preset::Ring)
    }
}

/// Built-in scenes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Colored particles in a flattened ring around the camera.
    Ring,
    /// Colored particles filling a cube in front of the camera.
    Cube,
    /// Soft additive sprites drawn without depth testing.
    Glow,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Preset::Ring, Preset::Cube, Preset::Glow];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Ring => "ring",
            Preset::Cube => "cube",
            Preset::Glow => "glow",
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .iter()
            .copied()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown preset '{s}'")))
    }
}

impl SceneConfig {
    pub fn preset(preset: Preset) -> Self {
        let ring = Self {
            particle_count: 300_000,
            sampling: SamplingPolicy::AnnularDisc {
                r_min: 15.0,
                r_max: 20.0,
                height: 10.0,
            },
            style: RenderStyle::default(),
            camera: CameraConfig::default(),
            rotation_rate: DEFAULT_ROTATION_RATE,
            max_pixel_ratio: MAX_PIXEL_RATIO,
        };
        let front = CameraConfig {
            position: [0.0, 0.0, 12.0],
            yaw_degrees: 0.0,
            ..CameraConfig::default()
        };

        match preset {
            Preset::Ring => ring,
            Preset::Cube => Self {
                particle_count: 20_000,
                sampling: SamplingPolicy::UniformCube { half_extent: 5.0 },
                camera: front,
                ..ring
            },
            Preset::Glow => Self {
                particle_count: 50_000,
                sampling: SamplingPolicy::UniformCube { half_extent: 10.0 },
                style: RenderStyle::glow(0.4),
                camera: CameraConfig {
                    position: [0.0, 0.0, 25.0],
                    ..front
                },
                ..ring
            },
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: SceneConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded scene config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(Error::InvalidArgument(
                "particle_count must be positive".to_string(),
            ));
        }
        self.sampling.validate()?;
        if !self.style.is_valid() {
            return Err(Error::InvalidArgument(format!(
                "invalid render style: {:?}",
                self.style
            )));
        }
        if !self.rotation_rate.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "rotation_rate must be finite, got {}",
                self.rotation_rate
            )));
        }
        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "max_pixel_ratio must be positive, got {}",
                self.max_pixel_ratio
            )));
        }
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::InvalidArgument(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(Error::InvalidArgument(format!(
                "camera fov must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }
        Ok(())
    }
}
