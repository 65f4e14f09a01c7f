//! Analytic flow-field primitives.
//!
//! A primitive is a stateless vector field centred on a point in normalized
//! `[0, 1]` grid space. Four kinds exist:
//!
//! | Kind | Field |
//! |------|-------|
//! | [`PrimitiveKind::Uniform`] | constant flow along `direction` |
//! | [`PrimitiveKind::Source`] | radial outflow |
//! | [`PrimitiveKind::Sink`] | radial inflow |
//! | [`PrimitiveKind::Vortex`] | swirl around `axis` |
//!
//! Every kind is zero at and beyond its radius and fades linearly towards
//! the rim inside it. The set is closed, so [`evaluate`] matches on it
//! exhaustively instead of dispatching through a trait object.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The closed set of primitive kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum PrimitiveKind {
    Uniform = 0,
    Source = 1,
    Sink = 2,
    Vortex = 3,
}

impl PrimitiveKind {
    /// The kinds a composite may pair with its vortex.
    pub const BASE_ROLES: [PrimitiveKind; 3] =
        [PrimitiveKind::Uniform, PrimitiveKind::Sink, PrimitiveKind::Source];

    /// Tag written into hand-off buffers.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Sign applied to the flux parameter: sources push out, sinks pull in.
    fn flux_sign(self) -> f32 {
        match self {
            PrimitiveKind::Sink => -1.0,
            _ => 1.0,
        }
    }
}

/// Parameters of a single primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowParams {
    /// Center in normalized grid space.
    pub position: Vec3,
    /// Radius of influence in normalized grid space.
    pub radius: f32,
    /// Swirl (vortex) or flux (source/sink/uniform) parameter.
    pub param: f32,
    /// Overall multiplier.
    pub strength: f32,
    /// Flow direction of a uniform primitive (unit length).
    pub direction: Vec3,
    /// Rotation axis of a vortex (unit length).
    pub axis: Vec3,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            position: Vec3::splat(0.5),
            radius: 0.25,
            param: 1.0,
            strength: 1.0,
            direction: Vec3::X,
            axis: Vec3::Y,
        }
    }
}

/// Contribution of a primitive of `kind` at `point` (normalized grid space).
pub fn evaluate(kind: PrimitiveKind, params: &FlowParams, point: Vec3) -> Vec3 {
    let offset = point - params.position;
    let dist = offset.length();
    if params.radius <= 0.0 || dist >= params.radius {
        return Vec3::ZERO;
    }
    let falloff = 1.0 - dist / params.radius;
    let gain = params.param * params.strength * falloff;

    match kind {
        PrimitiveKind::Uniform => params.direction * gain,
        PrimitiveKind::Source | PrimitiveKind::Sink => {
            if dist < 1e-6 {
                return Vec3::ZERO;
            }
            offset / dist * gain * kind.flux_sign()
        }
        PrimitiveKind::Vortex => {
            // Project onto the plane perpendicular to the axis
            let radial = offset - offset.dot(params.axis) * params.axis;
            let r = radial.length();
            if r < 1e-6 {
                return Vec3::ZERO;
            }
            params.axis.cross(radial) / r * gain
        }
    }
}

/// A primitive owned by a composite.
///
/// Only the position (every tick) and the size-derived radius and strength
/// change after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPrimitive {
    kind: PrimitiveKind,
    params: FlowParams,
}

impl FlowPrimitive {
    pub fn new(kind: PrimitiveKind, params: FlowParams) -> Self {
        Self { kind, params }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    pub fn position(&self) -> Vec3 {
        self.params.position
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.params.position = position;
    }

    pub(crate) fn set_scale(&mut self, radius: f32, strength: f32) {
        self.params.radius = radius;
        self.params.strength = strength;
    }

    /// Contribution at `point`.
    #[inline]
    pub fn sample(&self, point: Vec3) -> Vec3 {
        evaluate(self.kind, &self.params, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FlowParams {
        FlowParams {
            position: Vec3::splat(0.5),
            radius: 0.2,
            param: 1.0,
            strength: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_outside_radius() {
        let p = params();
        for kind in [
            PrimitiveKind::Uniform,
            PrimitiveKind::Source,
            PrimitiveKind::Sink,
            PrimitiveKind::Vortex,
        ] {
            assert_eq!(evaluate(kind, &p, Vec3::new(0.8, 0.5, 0.5)), Vec3::ZERO);
            assert_eq!(evaluate(kind, &p, Vec3::new(0.5, 0.5, 0.75)), Vec3::ZERO);
        }
    }

    #[test]
    fn test_uniform_follows_direction() {
        let p = params();
        let v = evaluate(PrimitiveKind::Uniform, &p, Vec3::splat(0.5));
        assert!((v - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_source_and_sink_are_opposite() {
        let p = params();
        let q = Vec3::new(0.6, 0.5, 0.5);
        let out = evaluate(PrimitiveKind::Source, &p, q);
        let inward = evaluate(PrimitiveKind::Sink, &p, q);
        assert!(out.x > 0.0);
        assert!((out + inward).length() < 1e-6);
        // falloff at half radius
        assert!((out.x - 2.0 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_vortex_is_tangential() {
        let p = FlowParams { param: 10.0, ..params() };
        let q = Vec3::new(0.6, 0.5, 0.5);
        let v = evaluate(PrimitiveKind::Vortex, &p, q);
        assert!(v.dot(q - p.position).abs() < 1e-5);
        assert!(v.dot(p.axis).abs() < 1e-5);
        assert!(v.length() > 0.0);
    }

    #[test]
    fn test_center_singularities_are_zero() {
        let p = params();
        assert_eq!(evaluate(PrimitiveKind::Source, &p, p.position), Vec3::ZERO);
        assert_eq!(evaluate(PrimitiveKind::Vortex, &p, p.position), Vec3::ZERO);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(PrimitiveKind::Uniform.tag(), 0);
        assert_eq!(PrimitiveKind::Source.tag(), 1);
        assert_eq!(PrimitiveKind::Sink.tag(), 2);
        assert_eq!(PrimitiveKind::Vortex.tag(), 3);
    }
}
