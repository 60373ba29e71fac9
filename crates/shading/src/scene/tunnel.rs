use glam::{Vec2, Vec3, Vec4};
use sceneconfig::{CapsuleTable, TunnelTable, VariantKind};

use crate::math::fract;
use crate::palette::Palette;
use crate::sdf::{rhombus_distance, uneven_capsule_distance};
use crate::uniforms::FrameUniforms;

use super::{finish, Evaluator};

/// Number of domain folds applied per pixel.
pub const FOLD_ITERATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub start_radius: f32,
    pub end_radius: f32,
    pub height: f32,
}

impl From<&CapsuleTable> for CapsuleShape {
    fn from(table: &CapsuleTable) -> Self {
        Self {
            start_radius: table.start_radius,
            end_radius: table.end_radius,
            height: table.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelConfig {
    pub fold_scale: f32,
    pub fold_offset: f32,
    /// Amplitude of the `sin(time * wobble_rate)` term added to the capsule
    /// copy's fold scale.
    pub wobble: f32,
    pub wobble_rate: f32,
    pub half_diagonals: Vec2,
    pub capsule: CapsuleShape,
    /// Palette key offset of each fold, in fold order.
    pub palette_offsets: [f32; FOLD_ITERATIONS],
    pub palette_speed: f32,
}

impl From<&TunnelTable> for TunnelConfig {
    fn from(table: &TunnelTable) -> Self {
        Self {
            fold_scale: table.fold_scale,
            fold_offset: table.fold_offset,
            wobble: table.wobble,
            wobble_rate: table.wobble_rate,
            half_diagonals: Vec2::from_array(table.half_diagonals),
            capsule: CapsuleShape::from(&table.capsule),
            palette_offsets: table.palette_offsets,
            palette_speed: table.palette_speed,
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self::from(&TunnelTable::default())
    }
}

/// Values computed by one fold.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FoldSample {
    box_distance: f32,
    capsule_distance: f32,
    color: Vec3,
}

/// Self-similar tiling from repeated `fract` folds of two coordinate copies.
///
/// The coordinates carry over from fold to fold but the sampled distances and
/// color do not: each fold replaces the previous sample, so the pixel is
/// built from the last fold alone.
#[derive(Debug, Clone)]
pub struct Tunnel {
    palette: Palette,
    config: TunnelConfig,
}

impl Tunnel {
    pub fn new(palette: Palette, config: TunnelConfig) -> Self {
        Self { palette, config }
    }

    fn fold(&self, uv: Vec2, time: f32) -> FoldSample {
        let cfg = &self.config;
        let origin_radius = uv.length();
        let warp_scale = cfg.fold_scale + (time * cfg.wobble_rate).sin() * cfg.wobble;

        let mut tiles = uv;
        let mut warped = uv;
        let mut sample = FoldSample {
            box_distance: 0.0,
            capsule_distance: 0.0,
            color: Vec3::ZERO,
        };

        for offset in cfg.palette_offsets {
            tiles = fract(tiles * cfg.fold_scale) - Vec2::splat(cfg.fold_offset);
            warped = fract(warped * warp_scale) - Vec2::splat(cfg.fold_offset);

            sample = FoldSample {
                box_distance: rhombus_distance(tiles, cfg.half_diagonals),
                capsule_distance: uneven_capsule_distance(
                    warped,
                    cfg.capsule.start_radius,
                    cfg.capsule.end_radius,
                    cfg.capsule.height,
                ),
                color: self
                    .palette
                    .sample(origin_radius + offset + time * cfg.palette_speed),
            };
        }

        sample
    }
}

impl Default for Tunnel {
    fn default() -> Self {
        Self::new(Palette::TUNNEL, TunnelConfig::default())
    }
}

impl Evaluator for Tunnel {
    fn variant(&self) -> VariantKind {
        VariantKind::Tunnel
    }

    fn evaluate(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec4 {
        let mut uv = uniforms.normalize(frag_coord);
        if let Some(mouse) = uniforms.mouse {
            uv -= uniforms.normalize(mouse);
        }

        let sample = self.fold(uv, uniforms.time);
        finish(
            sample.color * sample.box_distance * sample.capsule_distance,
            uniforms.fade,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec2> {
        (0..12).flat_map(|y| (0..16).map(move |x| Vec2::new(x as f32 * 4.0 + 0.5, y as f32 * 4.0 + 0.5)))
    }

    #[test]
    fn only_the_last_fold_reaches_the_pixel() {
        let base = Tunnel::default();
        let rewritten_early = Tunnel::new(
            Palette::TUNNEL,
            TunnelConfig {
                palette_offsets: [7.25, -3.5, TunnelConfig::default().palette_offsets[2]],
                ..TunnelConfig::default()
            },
        );
        let rewritten_last = Tunnel::new(
            Palette::TUNNEL,
            TunnelConfig {
                palette_offsets: [0.0, 0.4, 0.55],
                ..TunnelConfig::default()
            },
        );

        let uniforms = FrameUniforms::new(64, 48).with_time(1.3);
        let mut last_differs = false;
        for frag in grid() {
            let expected = base.evaluate(frag, &uniforms);
            assert_eq!(rewritten_early.evaluate(frag, &uniforms), expected);
            if rewritten_last.evaluate(frag, &uniforms) != expected {
                last_differs = true;
            }
        }
        assert!(last_differs);
    }

    #[test]
    fn output_is_finite_and_opaque() {
        let tunnel = Tunnel::default();
        for time in [0.0_f32, 0.31, 12.0] {
            let uniforms = FrameUniforms::new(64, 48).with_time(time);
            for frag in grid() {
                let color = tunnel.evaluate(frag, &uniforms);
                assert!(color.is_finite());
                assert_eq!(color.w, 1.0);
            }
        }
    }

    #[test]
    fn mouse_shifts_the_fold_origin() {
        let tunnel = Tunnel::default();
        let uniforms = FrameUniforms::new(64, 48).with_time(0.5);
        let centered = uniforms.with_mouse(Vec2::new(32.0, 24.0));
        let moved = uniforms.with_mouse(Vec2::new(10.0, 5.0));
        let frag = Vec2::new(20.5, 30.5);
        assert_eq!(tunnel.evaluate(frag, &uniforms), tunnel.evaluate(frag, &centered));
        assert_ne!(tunnel.evaluate(frag, &uniforms), tunnel.evaluate(frag, &moved));
    }

    #[test]
    fn zero_height_viewport_is_finite() {
        let tunnel = Tunnel::default();
        let uniforms = FrameUniforms::new(0, 0).with_time(2.0);
        assert!(tunnel.evaluate(Vec2::new(0.5, 0.5), &uniforms).is_finite());
    }
}
