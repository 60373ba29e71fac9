use glam::{Vec2, Vec4};
use sceneconfig::{HighlightTable, VariantKind};

use crate::palette::Palette;
use crate::sdf::rhombus_distance;
use crate::uniforms::FrameUniforms;

use super::rings::TwinRings;
use super::{finish, Evaluator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightConfig {
    pub half_diagonals: Vec2,
    /// Angular rate of the `sin(time * rate)` frequency modulation.
    pub modulation_rate: f32,
    pub modulated_channel: usize,
}

impl From<&HighlightTable> for HighlightConfig {
    fn from(table: &HighlightTable) -> Self {
        Self {
            half_diagonals: Vec2::from_array(table.half_diagonals),
            modulation_rate: table.modulation_rate,
            modulated_channel: table.modulated_channel.index(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self::from(&HighlightTable::default())
    }
}

/// Twin rings plus a rhombus term added as `distance * color`.
///
/// The rhombus term is not masked or clamped: it darkens inside the shape,
/// brightens outside, and can leave `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Highlight {
    rings: TwinRings,
    palette: Palette,
    config: HighlightConfig,
}

impl Highlight {
    pub fn new(rings: TwinRings, palette: Palette, config: HighlightConfig) -> Self {
        Self {
            rings,
            palette,
            config,
        }
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::new(
            TwinRings::default(),
            Palette::HIGHLIGHT,
            HighlightConfig::default(),
        )
    }
}

impl Evaluator for Highlight {
    fn variant(&self) -> VariantKind {
        VariantKind::Highlight
    }

    fn evaluate(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec4 {
        let uv = uniforms.normalize(frag_coord);
        let time = uniforms.time;

        let rings = self.rings.shade(uv, time);
        let distance = rhombus_distance(uv, self.config.half_diagonals);
        let palette = self.palette.with_scaled_frequency(
            self.config.modulated_channel,
            (time * self.config.modulation_rate).sin(),
        );

        finish(rings + palette.sample(distance) * distance, uniforms.fade)
    }
}
