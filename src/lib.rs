//! # rainfx - Rain wind and surface flow simulation
//!
//! CPU simulation core for real-time rain rendering. Two independent
//! subsystems are stepped once per frame and hand read-only buffers to a
//! renderer:
//!
//! - an **energy cascade** of composite wind primitives that exchange
//!   energy over time and are sampled into a wind field, and
//! - a **surface flow automaton** moving drops of water across a textured
//!   surface by roulette over physical and material probabilities.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rainfx::prelude::*;
//!
//! fn main() -> Result<(), SimError> {
//!     let config = SimulationConfig::default()
//!         .with_seed(42)
//!         .with_surface(SurfaceConfig::new(64).with_rain_rate(20.0));
//!     let mut sim = RainSimulation::new(&config)?;
//!
//!     for _ in 0..600 {
//!         sim.step(1.0 / 60.0);
//!         let wind: &[u8] = sim.wind().composite_bytes();
//!         let wetness = sim.surface().flow_map();
//!         // hand both to the renderer
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Energy cascade
//!
//! Each [`CompositePrimitive`] bundles a vortex with a uniform, source or
//! sink primitive and travels along a [`WindPath`]. Its *size* is its
//! energy; speed and strength follow from it. Every tick the
//! [`EnergyCascade`] drains tall composites into medium ones and medium
//! into small ones, dissipates small ones into a pool, and respawns from
//! that pool. Energy in the system never grows.
//!
//! ### Wind field
//!
//! [`WindFieldGenerator`] packs the population into [`PrimitiveGpu`]
//! records and, in [`WindOutput::DenseGrid`] mode, samples a dense
//! [`Grid`] of wind vectors.
//!
//! ### Surface flow
//!
//! [`RainFlow`] owns the [`SurfaceMaps`] (affinity, flow, obstacles,
//! normals) and the live drops. A drop that overcomes adhesion picks a
//! neighbor from four factors (Newton's law, affinity, wetness, obstacles),
//! leaves some water behind and picks up whatever already sits on the
//! destination.
//!
//! ## Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`SimulationConfig`] and the per-subsystem configs |
//! | [`cascade`] | [`EnergyCascade`], [`SizeBand`], diagnostics |
//! | [`wind`] | [`WindFieldGenerator`], [`PrimitiveGpu`] |
//! | [`surface`] | [`SurfaceMaps`], image import/export |
//! | [`probability`] | direction factors, roulette, retention curve |
//! | [`rainflow`] | [`RainFlow`], [`Droplet`], [`SurfaceEvent`] |
//! | [`simulation`] | [`RainSimulation`] driver |

pub mod cascade;
pub mod clock;
pub mod composite;
pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod path;
pub mod primitive;
pub mod probability;
pub mod rainflow;
pub mod simulation;
pub mod surface;
pub mod wind;

pub use bytemuck;
pub use glam::{IVec2, UVec3, Vec2, Vec3};

pub use cascade::{CascadeEvent, CascadeStats, EnergyCascade, PrimitiveDiagnostic, SizeBand};
pub use clock::SimClock;
pub use composite::{CompositeId, CompositePrimitive};
pub use config::{CascadeConfig, SimulationConfig, SurfaceConfig, WindConfig, WindOutput};
pub use error::{Result, SimError};
pub use grid::{CellMap, Grid};
pub use math::{Bounds, SimRng};
pub use path::WindPath;
pub use primitive::{FlowParams, FlowPrimitive, PrimitiveKind};
pub use probability::Transition;
pub use rainflow::{DropId, Droplet, RainFlow, SurfaceEvent, SurfaceSnapshot};
pub use simulation::{RainSimulation, SimulationEvents, SimulationStats, SURFACE_SEED_SALT};
pub use surface::SurfaceMaps;
pub use wind::{PrimitiveGpu, WindFieldGenerator};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use rainfx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cascade::{EnergyCascade, SizeBand};
    pub use crate::clock::SimClock;
    pub use crate::config::{CascadeConfig, SimulationConfig, SurfaceConfig, WindConfig, WindOutput};
    pub use crate::error::SimError;
    pub use crate::math::Bounds;
    pub use crate::path::WindPath;
    pub use crate::primitive::PrimitiveKind;
    pub use crate::rainflow::{RainFlow, SurfaceEvent};
    pub use crate::simulation::RainSimulation;
    pub use crate::surface::SurfaceMaps;
    pub use crate::wind::{PrimitiveGpu, WindFieldGenerator};
    pub use crate::{IVec2, UVec3, Vec2, Vec3};
}
