//! Shared vector-math and sampling helpers.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The random source used throughout the crate.
pub type SimRng = rand::rngs::StdRng;

/// Axis-aligned world-space box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube from `-half` to `+half` on every axis.
    pub fn centered(half: f32) -> Self {
        Self::new(Vec3::splat(-half), Vec3::splat(half))
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether every axis has positive extent.
    pub fn is_valid(&self) -> bool {
        let s = self.size();
        s.x > 0.0 && s.y > 0.0 && s.z > 0.0
    }

    /// Map a world position into `[0, 1]` box space: `(p - min) / (max - min)`.
    #[inline]
    pub fn normalize(&self, p: Vec3) -> Vec3 {
        (p - self.min) / self.size()
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::centered(1.0)
    }
}

/// Standard normal sample via the Box-Muller transform.
pub fn box_muller(rng: &mut SimRng) -> f32 {
    // gen::<f32>() is in [0, 1); shift away from 0 for the log.
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Normal draw around `mean` with deviation `mean * rel_std`, truncated at 3 sigma.
pub fn normal_energy(rng: &mut SimRng, mean: f32, rel_std: f32) -> f32 {
    let z = box_muller(rng).clamp(-3.0, 3.0);
    mean + z * mean * rel_std
}

/// Uniform draw `mean + U(-mean*rel_std, mean*rel_std)`.
pub fn uniform_energy(rng: &mut SimRng, mean: f32, rel_std: f32) -> f32 {
    let spread = mean * rel_std;
    if spread <= 0.0 {
        return mean;
    }
    mean + rng.gen_range(-spread..=spread)
}

/// Z component of the 3D cross product of two planar vectors.
#[inline]
pub fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Unsigned angle between two planar vectors in degrees. Zero vectors yield 0.
pub fn angle_deg(a: Vec2, b: Vec2) -> f32 {
    let (Some(a), Some(b)) = (a.try_normalize(), b.try_normalize()) else {
        return 0.0;
    };
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Two unit vectors orthogonal to `dir` and to each other.
pub fn orthonormal_basis(dir: Vec3) -> (Vec3, Vec3) {
    let d = dir.try_normalize().unwrap_or(Vec3::X);
    d.any_orthonormal_pair()
}
