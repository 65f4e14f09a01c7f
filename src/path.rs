//! Parametric paths that composite primitives travel along.
//!
//! A path maps `t ∈ [0, 1]` to a world-space point. Composites advance `t`
//! by their speed each tick and wrap back to the start past `1.0`.

use crate::error::{Result, SimError};
use crate::math::Bounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A world-space parametric path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WindPath {
    /// Straight segment from `start` to `end`.
    Line { start: Vec3, end: Vec3 },
    /// Uniform Catmull-Rom spline through `points` (at least two).
    CatmullRom { points: Vec<Vec3> },
}

impl WindPath {
    /// Line through the box center along `direction`, spanning the box.
    pub fn across(bounds: &Bounds, direction: Vec3) -> Self {
        let dir = match direction.try_normalize() {
            Some(d) => d,
            None => {
                log::warn!("zero wind direction, default path runs along +X");
                Vec3::X
            }
        };
        let size = bounds.size();
        // Half-length of the chord through the center along dir.
        let half = 0.5 * (size / dir.abs().max(Vec3::splat(1e-6))).min_element();
        let center = bounds.center();
        WindPath::Line { start: center - dir * half, end: center + dir * half }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            WindPath::Line { start, end } if start == end => {
                Err(SimError::config("line path needs distinct endpoints"))
            }
            WindPath::CatmullRom { points } if points.len() < 2 => {
                Err(SimError::config("spline path needs at least two points"))
            }
            _ => Ok(()),
        }
    }

    /// Point at parameter `t` (clamped to `[0, 1]`).
    pub fn evaluate(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        match self {
            WindPath::Line { start, end } => start.lerp(*end, t),
            WindPath::CatmullRom { points } => {
                let (i, u) = segment(points.len(), t);
                let (p0, p1, p2, p3) = control(points, i);
                catmull_rom(p0, p1, p2, p3, u)
            }
        }
    }

    /// Unit tangent at `t`. Falls back to +X on degenerate spans.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let d = match self {
            WindPath::Line { start, end } => *end - *start,
            WindPath::CatmullRom { points } => {
                let (i, u) = segment(points.len(), t);
                let (p0, p1, p2, p3) = control(points, i);
                catmull_rom_derivative(p0, p1, p2, p3, u)
            }
        };
        d.try_normalize().unwrap_or(Vec3::X)
    }
}

/// Segment index and local parameter for `t` over `n` points.
fn segment(n: usize, t: f32) -> (usize, f32) {
    let segments = n.saturating_sub(1).max(1);
    let scaled = t * segments as f32;
    let i = (scaled.floor() as usize).min(segments - 1);
    (i, scaled - i as f32)
}

/// Control points for segment `i`, with clamped end points.
fn control(points: &[Vec3], i: usize) -> (Vec3, Vec3, Vec3, Vec3) {
    let last = points.len() - 1;
    let at = |k: isize| points[k.clamp(0, last as isize) as usize];
    let i = i as isize;
    (at(i - 1), at(i), at(i + 1), at(i + 2))
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, u: f32) -> Vec3 {
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

fn catmull_rom_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, u: f32) -> Vec3 {
    let u2 = u * u;
    0.5 * ((p2 - p0)
        + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u
        + 3.0 * (3.0 * p1 - p0 - 3.0 * p2 + p3) * u2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endpoints() {
        let path = WindPath::Line { start: Vec3::ZERO, end: Vec3::new(2.0, 0.0, 0.0) };
        assert_eq!(path.evaluate(0.0), Vec3::ZERO);
        assert_eq!(path.evaluate(1.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(path.evaluate(0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(path.evaluate(3.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(path.tangent(0.3), Vec3::X);
    }

    #[test]
    fn test_across_spans_box() {
        let bounds = Bounds::centered(1.0);
        let path = WindPath::across(&bounds, Vec3::new(3.0, 0.0, 0.0));
        assert!((path.evaluate(0.0) - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((path.evaluate(1.0) - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);

        let diagonal = WindPath::across(&bounds, Vec3::new(1.0, 1.0, 0.0));
        let end = diagonal.evaluate(1.0);
        assert!((end - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_spline_passes_through_points() {
        let points = vec![Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        let path = WindPath::CatmullRom { points: points.clone() };
        assert!((path.evaluate(0.0) - points[0]).length() < 1e-5);
        assert!((path.evaluate(0.5) - points[1]).length() < 1e-5);
        assert!((path.evaluate(1.0) - points[2]).length() < 1e-5);
        assert!(path.tangent(0.25).x > 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(WindPath::Line { start: Vec3::ONE, end: Vec3::ONE }.validate().is_err());
        assert!(WindPath::CatmullRom { points: vec![Vec3::ZERO] }.validate().is_err());
        assert!(WindPath::across(&Bounds::default(), Vec3::Z).validate().is_ok());
    }
}
