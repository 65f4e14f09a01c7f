//! Simulation configuration.
//!
//! Every tunable scalar of both subsystems lives here. A [`SimulationConfig`]
//! is built once, validated, and then handed by reference to each component
//! constructor; nothing in the crate reads ambient global state.
//!
//! # Example
//!
//! ```
//! use rainfx::config::{CascadeConfig, SimulationConfig, SurfaceConfig};
//!
//! let config = SimulationConfig::default()
//!     .with_seed(42)
//!     .with_cascade(CascadeConfig::default().with_initial_primitives(8))
//!     .with_surface(SurfaceConfig::new(128).with_critical_angle(80.0));
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Result, SimError};
use crate::math::Bounds;
use crate::path::WindPath;
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a rain simulation session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random draw in the session.
    pub seed: u64,
    /// Energy cascade constants.
    pub cascade: CascadeConfig,
    /// Wind field sampling constants.
    pub wind: WindConfig,
    /// Surface flow automaton constants.
    pub surface: SurfaceConfig,
    /// Step the wind and surface subsystems on separate rayon tasks.
    pub parallel: bool,
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cascade(mut self, cascade: CascadeConfig) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_wind(mut self, wind: WindConfig) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceConfig) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate every sub-configuration.
    pub fn validate(&self) -> Result<()> {
        self.cascade.validate()?;
        self.wind.validate()?;
        self.surface.validate()
    }
}

fn require(cond: bool, msg: &str) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(SimError::config(msg))
    }
}

// =========================================================================
// ENERGY CASCADE
// =========================================================================

/// Constants of the energy cascade and its composite primitives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Path traversal rate per unit of size: `speed = size * energy_speed`.
    pub energy_speed: f32,
    /// Strength per squared size: `strength = size² * energy_strength * k`.
    pub energy_strength: f32,
    /// The `k` factor of the strength relation.
    pub strength_coefficient: f32,
    /// Transfer rate coefficient (tall and medium bands).
    pub coeff_transfer: f32,
    /// Dissipation coefficient; also the fraction of each bucket leaked per tick.
    pub coeff_dissip: f32,
    /// Primitives above this size are tall.
    pub min_size_tall: f32,
    /// Primitives above this size (and not tall) are medium.
    pub min_size_medium: f32,
    /// Small primitives below this size are removed.
    pub min_size_small: f32,
    /// Mean energy of a newly created composite.
    pub mean_energy: f32,
    /// Relative deviation of new-composite energy.
    pub std_energy: f32,
    /// Composites created by a reset.
    pub initial_primitives: usize,
    /// Swirl parameter of the vortex component.
    pub vortex_param: f32,
    /// Parameter of the uniform/source/sink component.
    pub base_param: f32,
    /// Normalized radius per unit of size.
    pub radius_scale: f32,
    /// Maximum lateral offset from the path, world units.
    pub lateral_spread: f32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            energy_speed: 0.05,
            energy_strength: 0.5,
            strength_coefficient: 1.0,
            coeff_transfer: 0.02,
            coeff_dissip: 0.05,
            min_size_tall: 3.0,
            min_size_medium: 1.5,
            min_size_small: 0.5,
            mean_energy: 2.0,
            std_energy: 0.25,
            initial_primitives: 5,
            vortex_param: 10.0,
            base_param: 1.0,
            radius_scale: 0.1,
            lateral_spread: 0.2,
        }
    }
}

impl CascadeConfig {
    /// Set the three size-band thresholds.
    pub fn with_thresholds(mut self, small: f32, medium: f32, tall: f32) -> Self {
        self.min_size_small = small;
        self.min_size_medium = medium;
        self.min_size_tall = tall;
        self
    }

    /// Set the transfer and dissipation coefficients.
    pub fn with_coefficients(mut self, transfer: f32, dissip: f32) -> Self {
        self.coeff_transfer = transfer;
        self.coeff_dissip = dissip;
        self
    }

    /// Set mean and relative deviation of new-composite energy.
    pub fn with_energy(mut self, mean: f32, rel_std: f32) -> Self {
        self.mean_energy = mean;
        self.std_energy = rel_std;
        self
    }

    pub fn with_initial_primitives(mut self, count: usize) -> Self {
        self.initial_primitives = count;
        self
    }

    pub fn with_lateral_spread(mut self, spread: f32) -> Self {
        self.lateral_spread = spread;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require(
            self.min_size_small < self.min_size_medium && self.min_size_medium < self.min_size_tall,
            "size thresholds must satisfy min_size_small < min_size_medium < min_size_tall",
        )?;
        require(self.energy_speed > 0.0, "energy_speed must be positive")?;
        require((0.0..=1.0).contains(&self.coeff_dissip), "coeff_dissip must lie in [0, 1]")?;
        require(self.coeff_transfer >= 0.0, "coeff_transfer must be non-negative")?;
        require(self.mean_energy > 0.0, "mean_energy must be positive")?;
        require(self.std_energy >= 0.0, "std_energy must be non-negative")?;
        require(self.radius_scale > 0.0, "radius_scale must be positive")?;
        require(self.lateral_spread >= 0.0, "lateral_spread must be non-negative")
    }
}

// =========================================================================
// WIND FIELD
// =========================================================================

/// How the wind generator hands the primitive population to consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindOutput {
    /// Sample every primitive into the dense wind grid each tick.
    #[default]
    DenseGrid,
    /// Only produce the per-primitive parameter buffer; an external sampler
    /// builds the grid.
    Forward,
}

/// Wind grid and global wind settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Cells per axis.
    pub resolution: UVec3,
    /// World-space box covered by the grid.
    pub bounds: Bounds,
    /// Mean wind; its direction orients uniform components and the default
    /// path, its magnitude seeds cascade resets.
    pub global_wind: Vec3,
    /// Multiplier applied to summed primitive contributions.
    pub global_strength: f32,
    /// Output mode.
    pub output: WindOutput,
    /// Path the composites travel. `None` builds a line through the box
    /// center along `global_wind`.
    pub path: Option<WindPath>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            resolution: UVec3::splat(16),
            bounds: Bounds::default(),
            global_wind: Vec3::new(1.0, 0.0, 0.0),
            global_strength: 1.0,
            output: WindOutput::DenseGrid,
            path: None,
        }
    }
}

impl WindConfig {
    pub fn with_resolution(mut self, nx: u32, ny: u32, nz: u32) -> Self {
        self.resolution = UVec3::new(nx, ny, nz);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_global_wind(mut self, wind: Vec3) -> Self {
        self.global_wind = wind;
        self
    }

    pub fn with_global_strength(mut self, strength: f32) -> Self {
        self.global_strength = strength;
        self
    }

    pub fn with_output(mut self, output: WindOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_path(mut self, path: WindPath) -> Self {
        self.path = Some(path);
        self
    }

    /// The configured path, or the default line along the global wind.
    pub fn resolved_path(&self) -> WindPath {
        self.path
            .clone()
            .unwrap_or_else(|| WindPath::across(&self.bounds, self.global_wind))
    }

    pub fn validate(&self) -> Result<()> {
        require(
            self.resolution.min_element() > 0,
            "wind grid resolution must be positive on every axis",
        )?;
        require(self.bounds.is_valid(), "wind bounds must have positive extent on every axis")?;
        if let Some(path) = &self.path {
            path.validate()?;
        }
        Ok(())
    }
}

// =========================================================================
// SURFACE FLOW
// =========================================================================

/// Constants of the stochastic surface flow automaton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Cells per side (the surface is `size × size`).
    pub size: usize,
    /// World length of one cell edge.
    pub cell_size: f32,
    /// Constant external force (gravity) acting on every drop.
    pub external_force: Vec3,
    /// β: a drop sticks while its tangential force is below `β·affinity`.
    pub critical_force: f32,
    /// α1: weight of the Newton's-law factor (scaled by `|vp|`).
    pub alpha_newton: f32,
    /// α2: weight of the affinity factor.
    pub alpha_affinity: f32,
    /// θc in degrees: neighbors further than this from `vp` are gated out.
    pub critical_angle_deg: f32,
    /// Alignment tolerance when picking the two Newton candidates.
    pub newton_tolerance: f32,
    /// ε in the Newton weighting `1 / (|cross| + ε)`.
    pub newton_epsilon: f32,
    /// Affinity at or above which the retention curve is flat.
    pub retention_breakpoint: f32,
    /// Divisor of the logarithmic retention curve.
    pub retention_divisor: f32,
    /// Retention fraction above the breakpoint.
    pub retention_high: f32,
    /// Mass of a freshly added drop.
    pub base_mass: f32,
    /// Divisor normalizing flow mass for display.
    pub dripping_threshold: f32,
    /// Neighbors whose normal deviates from the local normal by more than
    /// this angle (degrees) are obstacles.
    pub obstacle_normal_angle_deg: f32,
    /// Random drops spawned per second (0 disables the emitter).
    pub rain_rate: f32,
    /// Uniform material affinity used until a material map is imported.
    pub affinity: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SurfaceConfig {
    /// Create a configuration for an `size × size` surface.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cell_size: 1.0 / 64.0,
            external_force: Vec3::new(0.0, -9.81, 0.0),
            critical_force: 10.0,
            alpha_newton: 1.0,
            alpha_affinity: 1.0,
            critical_angle_deg: 85.0,
            newton_tolerance: 0.1,
            newton_epsilon: 0.05,
            retention_breakpoint: 0.4,
            retention_divisor: 2.17,
            retention_high: 0.1,
            base_mass: 1.0,
            dripping_threshold: 10.0,
            obstacle_normal_angle_deg: 60.0,
            rain_rate: 0.0,
            affinity: 0.5,
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_external_force(mut self, force: Vec3) -> Self {
        self.external_force = force;
        self
    }

    pub fn with_critical_force(mut self, beta: f32) -> Self {
        self.critical_force = beta;
        self
    }

    /// Set α1 and α2.
    pub fn with_weights(mut self, alpha_newton: f32, alpha_affinity: f32) -> Self {
        self.alpha_newton = alpha_newton;
        self.alpha_affinity = alpha_affinity;
        self
    }

    pub fn with_critical_angle(mut self, degrees: f32) -> Self {
        self.critical_angle_deg = degrees;
        self
    }

    pub fn with_newton_tolerance(mut self, tolerance: f32) -> Self {
        self.newton_tolerance = tolerance;
        self
    }

    pub fn with_base_mass(mut self, mass: f32) -> Self {
        self.base_mass = mass;
        self
    }

    pub fn with_dripping_threshold(mut self, threshold: f32) -> Self {
        self.dripping_threshold = threshold;
        self
    }

    pub fn with_rain_rate(mut self, drops_per_second: f32) -> Self {
        self.rain_rate = drops_per_second;
        self
    }

    pub fn with_affinity(mut self, affinity: f32) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require(self.size > 0, "surface size must be positive")?;
        require(self.cell_size > 0.0, "cell_size must be positive")?;
        require(self.external_force.is_finite(), "external_force must be finite")?;
        require(self.critical_force >= 0.0, "critical_force must be non-negative")?;
        require(
            self.alpha_newton.is_finite()
                && self.alpha_newton >= 0.0
                && self.alpha_affinity.is_finite()
                && self.alpha_affinity >= 0.0,
            "roulette weights must be finite and non-negative",
        )?;
        require(
            self.critical_angle_deg > 0.0 && self.critical_angle_deg <= 180.0,
            "critical_angle_deg must lie in (0, 180]",
        )?;
        require(self.newton_epsilon > 0.0, "newton_epsilon must be positive")?;
        require(self.retention_divisor > 0.0, "retention_divisor must be positive")?;
        require(self.base_mass > 0.0, "base_mass must be positive")?;
        require(self.dripping_threshold > 0.0, "dripping_threshold must be positive")?;
        require(self.rain_rate >= 0.0, "rain_rate must be non-negative")?;
        require((0.0..=1.0).contains(&self.affinity), "affinity must lie in [0, 1]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Cascade Tests ==========

    #[test]
    fn test_cascade_defaults_valid() {
        assert!(CascadeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_cascade_threshold_order_rejected() {
        let config = CascadeConfig::default().with_thresholds(1.0, 1.0, 3.0);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfiguration(_))));

        let config = CascadeConfig::default().with_thresholds(0.5, 4.0, 3.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cascade_dissip_range() {
        let config = CascadeConfig::default().with_coefficients(0.02, 1.5);
        assert!(config.validate().is_err());
    }

    // ========== Wind Tests ==========

    #[test]
    fn test_wind_zero_resolution_rejected() {
        let config = WindConfig::default().with_resolution(8, 0, 8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wind_degenerate_bounds_rejected() {
        let config =
            WindConfig::default().with_bounds(Bounds::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)));
        assert!(config.validate().is_err());
    }

    // ========== Surface Tests ==========

    #[test]
    fn test_surface_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!(config.size, 64);
        assert!((config.critical_angle_deg - 85.0).abs() < 1e-6);
        assert!((config.retention_breakpoint - 0.4).abs() < 1e-6);
        assert!((config.retention_divisor - 2.17).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_surface_builder() {
        let config = SurfaceConfig::new(16)
            .with_weights(2.0, 0.5)
            .with_critical_angle(60.0)
            .with_base_mass(3.0)
            .with_rain_rate(12.0);
        assert_eq!(config.size, 16);
        assert_eq!(config.alpha_newton, 2.0);
        assert_eq!(config.alpha_affinity, 0.5);
        assert_eq!(config.critical_angle_deg, 60.0);
        assert_eq!(config.base_mass, 3.0);
        assert_eq!(config.rain_rate, 12.0);
    }

    #[test]
    fn test_surface_invalid_values_rejected() {
        assert!(SurfaceConfig::new(0).validate().is_err());
        assert!(SurfaceConfig::new(8).with_cell_size(0.0).validate().is_err());
        assert!(SurfaceConfig::new(8).with_weights(-1.0, 1.0).validate().is_err());
        assert!(SurfaceConfig::new(8).with_base_mass(0.0).validate().is_err());
    }

    // ========== Serde Tests ==========

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let json = r#"{ "seed": 9, "surface": { "size": 32, "rain_rate": 4.0 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).expect("config should parse");
        assert_eq!(config.seed, 9);
        assert_eq!(config.surface.size, 32);
        assert_eq!(config.surface.rain_rate, 4.0);
        assert_eq!(config.surface.base_mass, SurfaceConfig::default().base_mass);
        assert_eq!(config.cascade, CascadeConfig::default());
        assert!(config.validate().is_ok());
    }
}
