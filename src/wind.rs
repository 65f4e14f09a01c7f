//! Wind field generation from the cascade population.
//!
//! Each tick the generator turns the live composites into:
//!
//! - a packed [`PrimitiveGpu`] buffer (one record per composite, and one
//!   per owned sub-primitive) for renderers or external samplers, and
//! - in [`WindOutput::DenseGrid`] mode, a dense [`Grid`] of summed wind
//!   vectors scaled by `global_strength`.
//!
//! Both outputs are rewritten in place and stay valid until the next
//! [`WindFieldGenerator::update`].

use crate::cascade::EnergyCascade;
use crate::composite::CompositePrimitive;
use crate::config::{WindConfig, WindOutput};
use crate::error::Result;
use crate::grid::Grid;
use crate::primitive::FlowPrimitive;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rayon::prelude::*;

/// Packed primitive parameters for upload.
///
/// 32 bytes, no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PrimitiveGpu {
    /// Center in normalized grid space.
    pub position: [f32; 3],
    /// Composite size (energy proxy).
    pub size: f32,
    /// Radius of influence in normalized grid space.
    pub radius: f32,
    /// Swirl/flux parameter.
    pub param: f32,
    pub strength: f32,
    /// [`crate::PrimitiveKind`] tag.
    pub kind: u32,
}

impl PrimitiveGpu {
    /// Record for a composite, tagged with its non-vortex partner.
    pub fn from_composite(c: &CompositePrimitive) -> Self {
        let partner = c.primitives().iter().find(|p| p.kind() == c.base_kind());
        Self {
            position: c.position().to_array(),
            size: c.size(),
            radius: c.radius(),
            param: partner.map_or(0.0, |p| p.params().param),
            strength: c.strength(),
            kind: c.base_kind().tag(),
        }
    }

    /// Record for one sub-primitive of `owner`.
    pub fn from_primitive(owner: &CompositePrimitive, p: &FlowPrimitive) -> Self {
        let params = p.params();
        Self {
            position: params.position.to_array(),
            size: owner.size(),
            radius: params.radius,
            param: params.param,
            strength: params.strength,
            kind: p.kind().tag(),
        }
    }
}

/// Samples the cascade population into hand-off buffers.
pub struct WindFieldGenerator {
    config: WindConfig,
    grid: Grid,
    composite_params: Vec<PrimitiveGpu>,
    primitive_params: Vec<PrimitiveGpu>,
}

impl WindFieldGenerator {
    pub fn new(config: &WindConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.resolution, config.bounds)?;
        log::info!(
            "wind grid {}x{}x{} ({} cells), output {:?}",
            config.resolution.x,
            config.resolution.y,
            config.resolution.z,
            grid.len(),
            config.output
        );
        Ok(Self {
            config: config.clone(),
            grid,
            composite_params: Vec::new(),
            primitive_params: Vec::new(),
        })
    }

    pub fn config(&self) -> &WindConfig {
        &self.config
    }

    /// The dense wind grid (all zero in [`WindOutput::Forward`] mode).
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// One record per live composite.
    pub fn composite_params(&self) -> &[PrimitiveGpu] {
        &self.composite_params
    }

    /// One record per owned sub-primitive, flattened in composite order.
    pub fn primitive_params(&self) -> &[PrimitiveGpu] {
        &self.primitive_params
    }

    pub fn composite_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.composite_params)
    }

    pub fn primitive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.primitive_params)
    }

    /// Rebuild the outputs from the current population.
    pub fn update(&mut self, cascade: &EnergyCascade) {
        let composites = cascade.composites();

        self.composite_params.clear();
        self.composite_params.extend(composites.iter().map(PrimitiveGpu::from_composite));

        self.primitive_params.clear();
        self.primitive_params.extend(
            composites
                .iter()
                .flat_map(|c| {
                    c.primitives().iter().map(move |p| PrimitiveGpu::from_primitive(c, p))
                }),
        );

        if self.config.output == WindOutput::DenseGrid {
            self.sample_grid(composites);
        }
    }

    /// Wind at a normalized grid-space point.
    pub fn sample_at(&self, composites: &[CompositePrimitive], point: Vec3) -> Vec3 {
        sample(composites, point) * self.config.global_strength
    }

    fn sample_grid(&mut self, composites: &[CompositePrimitive]) {
        let res = self.grid.resolution();
        let (nx, ny) = (res.x as usize, res.y as usize);
        let inv = 1.0 / res.as_vec3();
        let strength = self.config.global_strength;

        // One z-slice per task.
        self.grid
            .data_mut()
            .par_chunks_mut(nx * ny)
            .enumerate()
            .for_each(|(k, slice)| {
                for i in 0..ny {
                    for j in 0..nx {
                        let point = (Vec3::new(j as f32, i as f32, k as f32) + 0.5) * inv;
                        slice[i * nx + j] = sample(composites, point) * strength;
                    }
                }
            });
    }
}

fn sample(composites: &[CompositePrimitive], point: Vec3) -> Vec3 {
    composites.iter().map(|c| c.sample(point)).sum()
}
