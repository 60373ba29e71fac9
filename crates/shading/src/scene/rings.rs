use glam::{Vec2, Vec3, Vec4};
use sceneconfig::{GuideTable, RingsTable, VariantKind};

use crate::math::{nonzero, smoothstep};
use crate::palette::Palette;
use crate::sdf::segment_distance;
use crate::uniforms::FrameUniforms;

use super::{finish, Evaluator};

/// Segment overlay added on top of the rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideConfig {
    pub from: Vec2,
    pub to: Vec2,
    pub divisor: Vec3,
    pub time_exponent: f32,
}

impl From<&GuideTable> for GuideConfig {
    fn from(table: &GuideTable) -> Self {
        Self {
            from: Vec2::from_array(table.from),
            to: Vec2::from_array(table.to),
            divisor: Vec3::from_array(table.divisor),
            time_exponent: table.time_exponent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingsConfig {
    pub offset: f32,
    pub radius: f32,
    pub lobes: f32,
    pub spin_rate: f32,
    pub edge: f32,
    pub guide: Option<GuideConfig>,
}

impl From<&RingsTable> for RingsConfig {
    fn from(table: &RingsTable) -> Self {
        Self {
            offset: table.offset,
            radius: table.radius,
            lobes: table.lobes,
            spin_rate: table.spin_rate,
            edge: table.edge,
            guide: table.guide.as_ref().map(GuideConfig::from),
        }
    }
}

impl Default for RingsConfig {
    fn default() -> Self {
        Self::from(&RingsTable::default())
    }
}

/// Two rings side by side, each masked by a lobed angular threshold that
/// spins with time, lit from below on the left and from above on the right.
#[derive(Debug, Clone)]
pub struct TwinRings {
    palette: Palette,
    config: RingsConfig,
}

impl TwinRings {
    pub fn new(palette: Palette, config: RingsConfig) -> Self {
        Self { palette, config }
    }

    /// Ring color before fade, for a coordinate already in screen space.
    pub(crate) fn shade(&self, uv: Vec2, time: f32) -> Vec3 {
        let cfg = &self.config;

        let mut right = uv;
        let mut left = uv;
        right.x += cfg.offset;
        left.x -= cfg.offset;

        let d1 = ((right * 2.0).length() - cfg.radius).abs();
        let d2 = ((left * 2.0).length() - cfg.radius).abs();
        let color = self.palette.sample(d1);

        // Lobe angles are measured around the opposite ring's center.
        right.x -= 2.0 * cfg.offset;
        left.x += 2.0 * cfg.offset;

        let a1 = left.y.atan2(left.x) + time * cfg.spin_rate;
        let a2 = right.y.atan2(right.x) - time * cfg.spin_rate;

        let r1 = smoothstep(-0.5, 1.0, (a1 * cfg.lobes).cos()) * 0.2 + 0.4;
        let r2 = smoothstep(-0.5, 1.0, (a2 * cfg.lobes).cos()) * -0.2 + 0.6;

        let g1 = 1.0 - smoothstep(r1, r1 + cfg.edge, d1);
        let g2 = 1.0 - smoothstep(r2, r2 + cfg.edge, d2);

        let mut rgb = color * g1 * -right.y + color * g2 * left.y;

        if let Some(guide) = &cfg.guide {
            let line = segment_distance(uv, guide.from, guide.to);
            // Green's divisor is zero at time 0 and clamps to EPSILON, so the
            // overlay saturates green across the frame on the first frame.
            let mut divisor = guide.divisor;
            divisor.y *= time.abs().powf(guide.time_exponent);
            let divisor = Vec3::new(nonzero(divisor.x), nonzero(divisor.y), nonzero(divisor.z));
            rgb += Vec3::splat(line) / divisor;
        }

        rgb
    }
}

impl Default for TwinRings {
    fn default() -> Self {
        Self::new(Palette::TWIN_RINGS, RingsConfig::default())
    }
}

impl Evaluator for TwinRings {
    fn variant(&self) -> VariantKind {
        VariantKind::TwinRings
    }

    fn evaluate(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec4 {
        let uv = uniforms.normalize(frag_coord);
        finish(self.shade(uv, uniforms.time), uniforms.fade)
    }
}
