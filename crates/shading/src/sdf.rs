//! Signed distance fields for the 2D primitives the scenes are built from.
//!
//! All fields are continuous and return `0` on the shape boundary. The
//! rhombus and capsule are negative inside; the segment is an unsigned
//! distance. Degenerate parameters are clamped so every field stays finite.

use glam::Vec2;

use crate::math::{ndot, nonzero, sign, EPSILON};

/// Distance from `p` to the closest point of the segment `[a, b]`.
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let len_sq = ba.length_squared();
    if len_sq < EPSILON {
        return pa.length();
    }
    let h = (pa.dot(ba) / len_sq).clamp(0.0, 1.0);
    (pa - ba * h).length()
}

/// Signed distance to a rhombus centered at the origin with the given
/// half-diagonals along x and y.
pub fn rhombus_distance(p: Vec2, half_diagonals: Vec2) -> f32 {
    let p = p.abs();
    let b = half_diagonals;
    let h = (ndot(b - 2.0 * p, b) / b.length_squared().max(EPSILON)).clamp(-1.0, 1.0);
    let d = (p - 0.5 * b * Vec2::new(1.0 - h, 1.0 + h)).length();
    d * sign(p.x * b.y + p.y * b.x - b.x * b.y)
}

/// Signed distance to a capsule running from the origin up to `(0, height)`
/// whose end caps have radii `r1` (bottom) and `r2` (top).
pub fn uneven_capsule_distance(p: Vec2, r1: f32, r2: f32, height: f32) -> f32 {
    let p = Vec2::new(p.x.abs(), p.y);
    let height = nonzero(height);
    let b = (r1 - r2) / height;
    let a = (1.0 - b * b).max(0.0).sqrt();
    let k = p.dot(Vec2::new(-b, a));
    if k < 0.0 {
        return p.length() - r1;
    }
    if k > a * height {
        return (p - Vec2::new(0.0, height)).length() - r2;
    }
    p.dot(Vec2::new(a, b)) - r1
}
