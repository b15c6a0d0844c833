//! Particle field generation.
//!
//! A field is two parallel flat buffers, `positions` and `colors`, each holding
//! three `f32` per particle. Particle `i` owns the slots `[3i, 3i + 3)` in both.

use std::f32::consts::TAU;

use rand::distributions::Standard;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Number of `f32` values stored per particle in each attribute buffer.
pub const ATTRIBUTE_STRIDE: usize = 3;

/// How a single particle position is drawn.
///
/// Colors are not part of the policy: every channel is always uniform in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// Each coordinate uniform in `[-half_extent, half_extent]`.
    UniformCube { half_extent: f32 },
    /// Angle uniform in `[0, 2π)`, radius uniform (linear, not by area) in
    /// `[r_min, r_max]`, height uniform in `[-height / 2, height / 2]`.
    ///
    /// Linear radius sampling packs more particles near the inner edge.
    AnnularDisc { r_min: f32, r_max: f32, height: f32 },
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::AnnularDisc {
            r_min: 15.0,
            r_max: 20.0,
            height: 10.0,
        }
    }
}

impl SamplingPolicy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::UniformCube { half_extent } => {
                if !half_extent.is_finite() || half_extent < 0.0 {
                    return Err(Error::InvalidArgument(format!(
                        "cube half extent must be finite and non-negative, got {half_extent}"
                    )));
                }
            }
            Self::AnnularDisc { r_min, r_max, height } => {
                if ![r_min, r_max, height].iter().all(|v| v.is_finite()) {
                    return Err(Error::InvalidArgument(
                        "disc parameters must be finite".to_string(),
                    ));
                }
                if r_min < 0.0 || r_min > r_max {
                    return Err(Error::InvalidArgument(format!(
                        "disc radii must satisfy 0 <= r_min <= r_max, got [{r_min}, {r_max}]"
                    )));
                }
                if height < 0.0 {
                    return Err(Error::InvalidArgument(format!(
                        "disc height must be non-negative, got {height}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draws one position into `position` and one color into `color`.
    ///
    /// Draw order is fixed (position draws first, then r, g, b) so a seeded
    /// source always reproduces the same field.
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, position: &mut [f32], color: &mut [f32]) {
        match *self {
            Self::UniformCube { half_extent } => {
                for coord in position.iter_mut() {
                    *coord = (unit(rng) - 0.5) * 2.0 * half_extent;
                }
            }
            Self::AnnularDisc { r_min, r_max, height } => {
                let theta = unit(rng) * TAU;
                let r = r_min + unit(rng) * (r_max - r_min);
                position[0] = r * theta.cos();
                position[1] = (unit(rng) - 0.5) * height;
                position[2] = r * theta.sin();
            }
        }

        for channel in color.iter_mut() {
            *channel = unit(rng);
        }
    }
}

fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.sample(Standard)
}

/// Position and color buffers for a fixed number of particles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleField {
    /// Generates `count` particles using a thread-local random source.
    ///
    /// Particles are filled in parallel; repeated calls give different fields.
    pub fn generate(count: usize, policy: SamplingPolicy) -> Result<Self> {
        let (mut positions, mut colors) = allocate(count, &policy)?;

        positions
            .par_chunks_mut(ATTRIBUTE_STRIDE)
            .zip(colors.par_chunks_mut(ATTRIBUTE_STRIDE))
            .for_each_init(thread_rng, |rng, (position, color)| {
                policy.sample_into(rng, position, color);
            });

        info!(count, ?policy, "Generated particle field");
        Ok(Self { positions, colors })
    }

    /// Generates `count` particles from an injected source, sequentially.
    pub fn generate_with<R: Rng + ?Sized>(
        count: usize,
        policy: SamplingPolicy,
        rng: &mut R,
    ) -> Result<Self> {
        let (mut positions, mut colors) = allocate(count, &policy)?;

        for (position, color) in positions
            .chunks_exact_mut(ATTRIBUTE_STRIDE)
            .zip(colors.chunks_exact_mut(ATTRIBUTE_STRIDE))
        {
            policy.sample_into(rng, position, color);
        }

        info!(count, ?policy, "Generated particle field from injected source");
        Ok(Self { positions, colors })
    }

    /// Wraps existing buffers, checking they describe the same non-empty set of particles.
    pub fn from_buffers(positions: Vec<f32>, colors: Vec<f32>) -> Result<Self> {
        if positions.is_empty() || positions.len() % ATTRIBUTE_STRIDE != 0 {
            return Err(Error::InvalidArgument(format!(
                "position buffer length {} is not a positive multiple of {ATTRIBUTE_STRIDE}",
                positions.len()
            )));
        }
        if positions.len() != colors.len() {
            return Err(Error::InvalidArgument(format!(
                "position and color buffers differ in length ({} vs {})",
                positions.len(),
                colors.len()
            )));
        }
        Ok(Self { positions, colors })
    }

    pub fn count(&self) -> usize {
        self.positions.len() / ATTRIBUTE_STRIDE
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn into_buffers(self) -> (Vec<f32>, Vec<f32>) {
        (self.positions, self.colors)
    }
}

fn allocate(count: usize, policy: &SamplingPolicy) -> Result<(Vec<f32>, Vec<f32>)> {
    if count == 0 {
        return Err(Error::InvalidArgument(
            "particle count must be positive".to_string(),
        ));
    }
    policy.validate()?;

    let len = count
        .checked_mul(ATTRIBUTE_STRIDE)
        .ok_or_else(|| Error::InvalidArgument(format!("particle count {count} is too large")))?;
    Ok((vec![0.0; len], vec![0.0; len]))
}
