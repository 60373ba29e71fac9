//! GLSL built-ins the stage relies on, with GLSL semantics rather than the
//! Rust standard library's where the two disagree (`sign(0) == 0`,
//! `fract(x) == x - floor(x)`).

use glam::{Vec2, Vec3};

/// Smallest magnitude a denominator may take inside the stage.
pub const EPSILON: f32 = 1e-6;

/// Hermite interpolation between two edges, clamped to `[0, 1]`.
///
/// Coincident edges degrade to a hard step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL `sign`: `-1`, `0` or `1`.
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

pub fn cos3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.cos(), v.y.cos(), v.z.cos())
}

/// Pushes `x` away from zero so it can be divided by, keeping its sign.
pub fn nonzero(x: f32) -> f32 {
    if x.abs() < EPSILON {
        if x.is_sign_negative() {
            -EPSILON
        } else {
            EPSILON
        }
    } else {
        x
    }
}

/// `a.x*b.x - a.y*b.y`, used by the rhombus field.
pub fn ndot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x - a.y * b.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn smoothstep_matches_glsl() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert_abs_diff_eq!(smoothstep(0.0, 1.0, 0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(smoothstep(-0.5, 1.0, 0.25), 0.5, epsilon = 1e-6);
        assert_eq!(smoothstep(0.3, 0.3, 0.2), 0.0);
        assert_eq!(smoothstep(0.3, 0.3, 0.3), 1.0);
    }

    #[test]
    fn sign_is_zero_at_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
    }

    #[test]
    fn fract_wraps_negative_values_upwards() {
        let wrapped = fract(Vec2::new(-0.25, 1.75));
        assert_abs_diff_eq!(wrapped.x, 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(wrapped.y, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn nonzero_keeps_sign() {
        assert_eq!(nonzero(0.0), EPSILON);
        assert_eq!(nonzero(-1e-9), -EPSILON);
        assert_eq!(nonzero(0.5), 0.5);
    }
}
