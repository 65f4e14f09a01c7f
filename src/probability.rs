//! Transition model of the surface flow automaton.
//!
//! A drop leaving its cell picks one of the eight neighbors by roulette
//! over a combined score built from four independent factors:
//!
//! | Factor | Symbol | Favors |
//! |--------|--------|--------|
//! | Newton's law | `D` | the two directions best aligned with the exit velocity |
//! | Affinity | `A` | sticky material within the critical angle |
//! | Wet/dry | `W` | already-wet cells within the critical angle |
//! | Obstacle | `E` | masks out blocked cells |
//!
//! ```text
//! R[k] = E[k] * (α1·|vp|·D[k] + α2·A[k] + W[k])
//! ```
//!
//! normalized by `Σ R`. A zero sum means the drop has nowhere to go.
//!
//! The kinematic helpers ([`time_to_exit`], [`travel_time`]) and the
//! retention curve used on departure live here as well.

use crate::config::SurfaceConfig;
use crate::math::{angle_deg, cross2};
use crate::surface::SurfaceMaps;
use glam::{IVec2, Vec2, Vec3};

/// Eight-neighborhood offsets, counter-clockwise from +X.
pub const NEIGHBORS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// One weight per neighbor, indexed like [`NEIGHBORS`].
pub type Weights = [f32; 8];

/// Retention fraction `H(affinity)` a departing drop leaves behind.
///
/// ```text
/// H(x) = retention_high              if x ≥ retention_breakpoint
///        ln(√x + 1) / retention_divisor otherwise
/// ```
pub fn retention(affinity: f32, config: &SurfaceConfig) -> f32 {
    if affinity >= config.retention_breakpoint {
        config.retention_high
    } else {
        (affinity.max(0.0).sqrt() + 1.0).ln() / config.retention_divisor
    }
}

/// Component of `force` in the tangent plane of `normal`.
pub fn tangential(force: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.try_normalize().unwrap_or(Vec3::Z);
    force - force.dot(n) * n
}

/// Whether a drop overcomes adhesion: `|F_t| ≥ β·affinity`.
pub fn should_move(tangential_force: Vec3, affinity: f32, critical_force: f32) -> bool {
    tangential_force.length() >= critical_force * affinity
}

/// Axis of a cell boundary crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// First cell-boundary crossing of a drop starting at the cell center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exit {
    pub time: f32,
    pub axis: Axis,
}

/// Smallest non-negative root of `½·a·t² + v·t = b` for `b ∈ {-half, half}`.
fn axis_exit(a: f32, v: f32, half: f32) -> Option<f32> {
    const EPS: f32 = 1e-9;
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t.is_finite() && t >= 0.0 && best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };
    for b in [-half, half] {
        if a.abs() < EPS {
            if v.abs() > EPS {
                consider(b / v);
            }
            continue;
        }
        let disc = v * v + 2.0 * a * b;
        if disc < 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        consider((-v + sq) / a);
        consider((-v - sq) / a);
    }
    best
}

/// Time for a drop at the cell center, moving with `velocity` under constant
/// `accel`, to reach one of the four walls at `±half`. `None` when it never
/// leaves (no velocity and no acceleration).
pub fn time_to_exit(accel: Vec2, velocity: Vec2, half: f32) -> Option<Exit> {
    let x = axis_exit(accel.x, velocity.x, half).map(|time| Exit { time, axis: Axis::X });
    let y = axis_exit(accel.y, velocity.y, half).map(|time| Exit { time, axis: Axis::Y });
    match (x, y) {
        (Some(x), Some(y)) => Some(if y.time < x.time { y } else { x }),
        (x, y) => x.or(y),
    }
}

/// Freeze time after a move: `distance / |accel|`, zero without acceleration.
pub fn travel_time(distance: f32, accel: f32) -> f32 {
    if accel > 0.0 {
        distance / accel
    } else {
        0.0
    }
}

fn normalize_weights(mut w: Weights) -> Weights {
    let sum: f32 = w.iter().sum();
    if sum > 0.0 {
        for v in &mut w {
            *v /= sum;
        }
    }
    w
}

/// Newton's-law factor `D`.
///
/// Only directions whose alignment with `vp` lies within `tolerance` of the
/// best or second-best alignment (and is positive) get weight, inversely
/// proportional to their angular deviation `|cross(vp̂, d̂)| + ε`.
pub fn newton(vp: Vec2, tolerance: f32, epsilon: f32) -> Weights {
    let Some(dir) = vp.try_normalize() else {
        return [0.0; 8];
    };
    let dots: Weights = std::array::from_fn(|k| NEIGHBORS[k].as_vec2().normalize().dot(dir));

    let mut top1 = f32::NEG_INFINITY;
    let mut top2 = f32::NEG_INFINITY;
    for &d in &dots {
        if d > top1 {
            top2 = top1;
            top1 = d;
        } else if d > top2 {
            top2 = d;
        }
    }

    let w = std::array::from_fn(|k| {
        let d = dots[k];
        let candidate = d > 0.0 && ((top1 - d).abs() <= tolerance || (top2 - d).abs() <= tolerance);
        if candidate {
            let n = NEIGHBORS[k].as_vec2().normalize();
            1.0 / (cross2(dir, n).abs() + epsilon)
        } else {
            0.0
        }
    });
    normalize_weights(w)
}

/// `U(d_k, vp)`: 1 when the neighbor lies within `theta_deg` of `vp`.
fn within_angle(k: usize, vp: Vec2, theta_deg: f32) -> bool {
    angle_deg(NEIGHBORS[k].as_vec2(), vp) <= theta_deg
}

/// Affinity factor `A`: neighbor affinity, gated by angle, normalized.
pub fn affinity_factor(maps: &SurfaceMaps, cell: IVec2, vp: Vec2, theta_deg: f32) -> Weights {
    let w = std::array::from_fn(|k| {
        let n = cell + NEIGHBORS[k];
        match maps.affinity.get(n.x, n.y) {
            Some(&a) if within_angle(k, vp, theta_deg) => a,
            _ => 0.0,
        }
    });
    normalize_weights(w)
}

/// Wet/dry factor `W`: 1 for wet neighbors, gated by angle, normalized.
pub fn wetness_factor(maps: &SurfaceMaps, cell: IVec2, vp: Vec2, theta_deg: f32) -> Weights {
    let w = std::array::from_fn(|k| {
        let n = cell + NEIGHBORS[k];
        match maps.flow.get(n.x, n.y) {
            Some(&m) if m > 0.0 && within_angle(k, vp, theta_deg) => 1.0,
            _ => 0.0,
        }
    });
    normalize_weights(w)
}

/// Obstacle factor `E`: 0 for flagged cells and for cells whose normal
/// deviates from the local normal by more than `max_angle_deg`; off-surface
/// neighbors are passable.
pub fn obstacle_factor(maps: &SurfaceMaps, cell: IVec2, max_angle_deg: f32) -> Weights {
    let reference = maps.normal.get_or(cell.x, cell.y, Vec3::Z);
    let min_cos = max_angle_deg.to_radians().cos();
    std::array::from_fn(|k| {
        let n = cell + NEIGHBORS[k];
        if !maps.obstacle.contains(n.x, n.y) {
            return 1.0;
        }
        let blocked = maps.obstacle.get_or(n.x, n.y, false)
            || maps.normal.get_or(n.x, n.y, Vec3::Z).dot(reference) < min_cos;
        if blocked {
            0.0
        } else {
            1.0
        }
    })
}

/// All four factors and their normalized combination for one decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub newton: Weights,
    pub affinity: Weights,
    pub wetness: Weights,
    pub obstacle: Weights,
    /// Normalized `R`; `None` when `Σ R == 0`.
    pub combined: Option<Weights>,
}

impl Transition {
    /// Evaluate the model for a drop in `cell` leaving with velocity `vp`.
    pub fn evaluate(maps: &SurfaceMaps, cell: IVec2, vp: Vec2, config: &SurfaceConfig) -> Self {
        let newton = newton(vp, config.newton_tolerance, config.newton_epsilon);
        let affinity = affinity_factor(maps, cell, vp, config.critical_angle_deg);
        let wetness = wetness_factor(maps, cell, vp, config.critical_angle_deg);
        let obstacle = obstacle_factor(maps, cell, config.obstacle_normal_angle_deg);
        let combined = combine(
            &newton,
            &affinity,
            &wetness,
            &obstacle,
            config.alpha_newton * vp.length(),
            config.alpha_affinity,
        );
        Self { newton, affinity, wetness, obstacle, combined }
    }
}

/// `E·(newton_weight·D + affinity_weight·A + W)`, normalized.
pub fn combine(
    d: &Weights,
    a: &Weights,
    w: &Weights,
    e: &Weights,
    newton_weight: f32,
    affinity_weight: f32,
) -> Option<Weights> {
    let r: Weights =
        std::array::from_fn(|k| e[k] * (newton_weight * d[k] + affinity_weight * a[k] + w[k]));
    let sum: f32 = r.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        Some(r.map(|v| v / sum))
    } else {
        None
    }
}

/// Roulette-wheel pick for `r ∈ [0, 1)`.
///
/// Walks the cumulative sum and returns the first direction with positive
/// probability at which it reaches `r`. If rounding keeps the sum below
/// `r`, the last positive direction is returned. `None` if every
/// probability is zero.
pub fn roulette(probabilities: &Weights, r: f32) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;
    for (k, &p) in probabilities.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        last = Some(k);
        cumulative += p;
        if cumulative >= r {
            return Some(k);
        }
    }
    last
}
