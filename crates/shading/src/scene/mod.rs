//! Shading strategies behind a single evaluator interface.
//!
//! - `rings` renders two counter-rotating lobed rings, optionally with a
//!   segment guide overlay.
//! - `highlight` layers an additive rhombus term over the rings.
//! - `tunnel` folds the plane three times and multiplies a rhombus field, an
//!   uneven capsule field and a radial palette sample from the final fold.
//!
//! Evaluators are pure: the output depends only on the fragment coordinate and
//! the uniforms passed in, so a host may evaluate pixels in any order.

mod highlight;
mod rings;
mod tunnel;

use std::fmt;

use glam::{Vec2, Vec4};
use sceneconfig::VariantKind;

use crate::uniforms::{FrameUniforms, UniformSet};

pub use highlight::{Highlight, HighlightConfig};
pub use rings::{GuideConfig, RingsConfig, TwinRings};
pub use tunnel::{CapsuleShape, Tunnel, TunnelConfig, FOLD_ITERATIONS};

/// Vertex-stage shape a fragment stage was authored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// Positions are already in clip space.
    Passthrough,
    /// Positions go through a projection and model-view matrix.
    Transformed,
}

impl fmt::Display for VertexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VertexLayout::Passthrough => "passthrough",
            VertexLayout::Transformed => "transformed",
        })
    }
}

/// Interface a fragment stage exposes to the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInterface {
    pub required: UniformSet,
    pub optional: UniformSet,
    pub vertex: VertexLayout,
}

impl StageInterface {
    pub fn for_variant(variant: VariantKind) -> Self {
        let base = UniformSet::RESOLUTION | UniformSet::TIME;
        match variant {
            VariantKind::TwinRings => Self {
                required: base,
                optional: UniformSet::FADE,
                vertex: VertexLayout::Passthrough,
            },
            VariantKind::Highlight => Self {
                required: base | UniformSet::FADE,
                optional: UniformSet::EMPTY,
                vertex: VertexLayout::Transformed,
            },
            VariantKind::Tunnel => Self {
                required: base,
                optional: UniformSet::MOUSE | UniformSet::FADE,
                vertex: VertexLayout::Transformed,
            },
        }
    }
}

/// A fragment stage: maps a pixel coordinate and frame uniforms to RGBA.
///
/// Alpha is always `1.0`.
pub trait Evaluator: Send + Sync {
    fn variant(&self) -> VariantKind;

    fn interface(&self) -> StageInterface {
        StageInterface::for_variant(self.variant())
    }

    fn evaluate(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec4;
}

/// Scales `rgb` by the bound fade, if any, and attaches an opaque alpha.
pub(crate) fn finish(rgb: glam::Vec3, fade: Option<f32>) -> Vec4 {
    let rgb = match fade {
        Some(level) => rgb * level,
        None => rgb,
    };
    rgb.extend(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_requires_fade() {
        let interface = StageInterface::for_variant(VariantKind::Highlight);
        assert!(interface.required.contains(UniformSet::FADE));
        assert_eq!(interface.vertex, VertexLayout::Transformed);
    }

    #[test]
    fn rings_take_passthrough_vertices() {
        let interface = StageInterface::for_variant(VariantKind::TwinRings);
        assert_eq!(interface.vertex, VertexLayout::Passthrough);
        assert!(!interface.required.contains(UniformSet::FADE));
        assert!(interface.optional.contains(UniformSet::FADE));
    }

    #[test]
    fn finish_keeps_alpha_opaque() {
        let color = finish(glam::Vec3::new(0.5, 1.0, 2.0), Some(0.5));
        assert_eq!(color, Vec4::new(0.25, 0.5, 1.0, 1.0));
        assert_eq!(finish(glam::Vec3::ONE, None).w, 1.0);
    }
}
