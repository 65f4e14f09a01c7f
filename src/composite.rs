//! Composite ("super") primitives.
//!
//! A composite bundles a vortex with one uniform, source or sink primitive.
//! Both share one anchor point travelling along a [`WindPath`] and one
//! energy value, its *size*. Speed and strength are never stored
//! independently of size:
//!
//! ```text
//! speed    = size * energy_speed
//! strength = size² * energy_strength * strength_coefficient
//! ```

use crate::config::CascadeConfig;
use crate::math::{orthonormal_basis, Bounds, SimRng};
use crate::path::WindPath;
use crate::primitive::{FlowParams, FlowPrimitive, PrimitiveKind};
use glam::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

/// Identifier handed out by the cascade, never reused within a session.
pub type CompositeId = u64;

/// Coefficients a composite needs to keep its derived values in step with size.
#[derive(Clone, Copy, Debug)]
struct Coefficients {
    energy_speed: f32,
    energy_strength: f32,
    strength_coefficient: f32,
    radius_scale: f32,
    lateral_spread: f32,
}

impl From<&CascadeConfig> for Coefficients {
    fn from(c: &CascadeConfig) -> Self {
        Self {
            energy_speed: c.energy_speed,
            energy_strength: c.energy_strength,
            strength_coefficient: c.strength_coefficient,
            radius_scale: c.radius_scale,
            lateral_spread: c.lateral_spread,
        }
    }
}

/// A bundle of primitives sharing position, size and energy.
#[derive(Clone, Debug)]
pub struct CompositePrimitive {
    id: CompositeId,
    primitives: Vec<FlowPrimitive>,
    size: f32,
    speed: f32,
    strength: f32,
    /// Path parameter in `[0, 1]`.
    t: f32,
    /// Lateral offset from the path, re-rolled on every wrap.
    lateral: Vec2,
    world_position: Vec3,
    /// `world_position` remapped into the `[0, 1]` box.
    position: Vec3,
    coeffs: Coefficients,
}

impl CompositePrimitive {
    /// Create a composite with `energy` at a random point of `path`.
    ///
    /// The vortex component is always present; its partner is drawn from
    /// uniform, sink and source.
    pub fn new(
        id: CompositeId,
        energy: f32,
        config: &CascadeConfig,
        wind_direction: Vec3,
        path: &WindPath,
        bounds: &Bounds,
        rng: &mut SimRng,
    ) -> Self {
        let base = *PrimitiveKind::BASE_ROLES.choose(rng).unwrap_or(&PrimitiveKind::Uniform);
        let t = rng.gen::<f32>();
        Self::with_roles(id, energy, config, base, t, wind_direction, path, bounds, rng)
    }

    /// Create a composite with an explicit partner kind and path parameter.
    #[allow(clippy::too_many_arguments)]
    pub fn with_roles(
        id: CompositeId,
        energy: f32,
        config: &CascadeConfig,
        base: PrimitiveKind,
        t: f32,
        wind_direction: Vec3,
        path: &WindPath,
        bounds: &Bounds,
        rng: &mut SimRng,
    ) -> Self {
        let direction = wind_direction.try_normalize().unwrap_or(Vec3::X);
        let vortex = FlowPrimitive::new(
            PrimitiveKind::Vortex,
            FlowParams {
                param: config.vortex_param,
                axis: Vec3::Y,
                direction,
                ..Default::default()
            },
        );
        let partner = FlowPrimitive::new(
            base,
            FlowParams { param: config.base_param, axis: Vec3::Y, direction, ..Default::default() },
        );

        let coeffs = Coefficients::from(config);
        let mut composite = Self {
            id,
            primitives: vec![vortex, partner],
            size: energy,
            speed: 0.0,
            strength: 0.0,
            t: t.clamp(0.0, 1.0),
            lateral: Vec2::ZERO,
            world_position: Vec3::ZERO,
            position: Vec3::ZERO,
            coeffs,
        };
        composite.roll_lateral(rng);
        composite.refresh();
        composite.place(path, bounds);
        composite
    }

    pub fn id(&self) -> CompositeId {
        self.id
    }

    /// Energy proxy.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Path parameter.
    pub fn t(&self) -> f32 {
        self.t
    }

    /// Position in normalized grid space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn primitives(&self) -> &[FlowPrimitive] {
        &self.primitives
    }

    /// The non-vortex partner kind.
    pub fn base_kind(&self) -> PrimitiveKind {
        self.primitives
            .iter()
            .map(FlowPrimitive::kind)
            .find(|k| *k != PrimitiveKind::Vortex)
            .unwrap_or(PrimitiveKind::Vortex)
    }

    /// Radius shared by the owned primitives.
    pub fn radius(&self) -> f32 {
        self.size.max(0.0) * self.coeffs.radius_scale
    }

    pub fn add_energy(&mut self, energy: f32) {
        self.size += energy;
        self.refresh();
    }

    /// Remove energy. The size may go transiently negative; the cascade's
    /// removal pass decides what happens next.
    pub fn sub_energy(&mut self, energy: f32) {
        self.size -= energy;
        self.refresh();
    }

    /// Advance along the path by `speed * dt` and push the new position
    /// into every owned primitive.
    pub fn update(&mut self, dt: f32, path: &WindPath, bounds: &Bounds, rng: &mut SimRng) {
        self.t += self.speed * dt;
        if self.t > 1.0 {
            self.t = 0.0;
            self.roll_lateral(rng);
        }
        self.place(path, bounds);
    }

    /// Summed contribution of the owned primitives at `point`.
    pub fn sample(&self, point: Vec3) -> Vec3 {
        self.primitives.iter().map(|p| p.sample(point)).sum()
    }

    fn roll_lateral(&mut self, rng: &mut SimRng) {
        let s = self.coeffs.lateral_spread;
        self.lateral = if s > 0.0 {
            Vec2::new(rng.gen_range(-s..=s), rng.gen_range(-s..=s))
        } else {
            Vec2::ZERO
        };
    }

    fn refresh(&mut self) {
        let c = self.coeffs;
        self.speed = self.size * c.energy_speed;
        self.strength = self.size * self.size * c.energy_strength * c.strength_coefficient;
        let radius = self.radius();
        for p in &mut self.primitives {
            p.set_scale(radius, self.strength);
        }
    }

    fn place(&mut self, path: &WindPath, bounds: &Bounds) {
        let (u, v) = orthonormal_basis(path.tangent(self.t));
        self.world_position = path.evaluate(self.t) + u * self.lateral.x + v * self.lateral.y;
        self.position = bounds.normalize(self.world_position);
        for p in &mut self.primitives {
            p.set_position(self.position);
        }
    }
}
