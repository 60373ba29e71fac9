use std::fmt;
use std::ops::BitOr;

use glam::Vec2;

use crate::runtime::TimeSample;

/// Set of uniforms a fragment stage reads or a host binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UniformSet {
    bits: u8,
}

impl UniformSet {
    pub const EMPTY: UniformSet = UniformSet { bits: 0 };
    pub const RESOLUTION: UniformSet = UniformSet { bits: 1 };
    pub const TIME: UniformSet = UniformSet { bits: 1 << 1 };
    pub const MOUSE: UniformSet = UniformSet { bits: 1 << 2 };
    pub const FADE: UniformSet = UniformSet { bits: 1 << 3 };

    const NAMED: [(UniformSet, &'static str); 4] = [
        (UniformSet::RESOLUTION, "resolution"),
        (UniformSet::TIME, "time"),
        (UniformSet::MOUSE, "mouse"),
        (UniformSet::FADE, "fade"),
    ];

    pub fn contains(self, other: UniformSet) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Members of `self` that `bound` does not provide.
    pub fn missing_from(self, bound: UniformSet) -> UniformSet {
        UniformSet {
            bits: self.bits & !bound.bits,
        }
    }

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for UniformSet {
    type Output = UniformSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        UniformSet {
            bits: self.bits | rhs.bits,
        }
    }
}

impl fmt::Display for UniformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<_> = self.names().collect();
        f.write_str(&names.join(", "))
    }
}

/// Typed per-frame inputs handed to the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Viewport size in pixels.
    pub resolution: Vec2,
    /// Seconds since the clock started.
    pub time: f32,
    pub time_delta: f32,
    pub frame: u64,
    /// Pointer position in pixels, bottom-left origin.
    pub mouse: Option<Vec2>,
    pub fade: Option<f32>,
}

impl FrameUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: Vec2::new(width as f32, height as f32),
            time: 0.0,
            time_delta: 0.0,
            frame: 0,
            mouse: None,
            fade: None,
        }
    }

    /// Advances to `sample`. The clock never runs backwards: an earlier sample
    /// keeps the current time and reports a zero delta.
    pub fn update_time(&mut self, sample: TimeSample) {
        let first = sample.frame_index == 0;
        let seconds = if first {
            sample.seconds
        } else {
            sample.seconds.max(self.time)
        };
        self.time_delta = if first { 0.0 } else { seconds - self.time };
        self.time = seconds;
        self.frame = sample.frame_index;
    }

    pub fn with_time(mut self, seconds: f32) -> Self {
        self.time = seconds;
        self
    }

    pub fn with_fade(mut self, fade: f32) -> Self {
        self.fade = Some(fade);
        self
    }

    pub fn with_mouse(mut self, mouse: Vec2) -> Self {
        self.mouse = Some(mouse);
        self
    }

    /// Uniforms currently carrying a value.
    pub fn bound(&self) -> UniformSet {
        let mut set = UniformSet::RESOLUTION | UniformSet::TIME;
        if self.mouse.is_some() {
            set = set | UniformSet::MOUSE;
        }
        if self.fade.is_some() {
            set = set | UniformSet::FADE;
        }
        set
    }

    pub fn normalize(&self, frag_coord: Vec2) -> Vec2 {
        normalized_coordinate(frag_coord, self.resolution)
    }
}

/// Maps a pixel coordinate to aspect-correct screen space where the
/// viewport's vertical extent spans `[-1, 1]`.
///
/// A zero (or sub-pixel) height is treated as one pixel.
pub fn normalized_coordinate(frag_coord: Vec2, resolution: Vec2) -> Vec2 {
    (frag_coord * 2.0 - resolution) / resolution.y.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_center_to_origin() {
        let uv = normalized_coordinate(Vec2::new(50.0, 25.0), Vec2::new(100.0, 50.0));
        assert_eq!(uv, Vec2::ZERO);
        let corner = normalized_coordinate(Vec2::ZERO, Vec2::new(2.0, 2.0));
        assert_eq!(corner, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn zero_height_resolution_is_clamped() {
        let uv = normalized_coordinate(Vec2::new(3.0, 0.0), Vec2::new(4.0, 0.0));
        assert!(uv.is_finite());
        assert_eq!(uv, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn update_time_is_monotonic() {
        let mut uniforms = FrameUniforms::new(4, 4);
        uniforms.update_time(TimeSample::new(1.0, 0));
        assert_eq!(uniforms.time_delta, 0.0);
        uniforms.update_time(TimeSample::new(1.5, 1));
        assert_eq!(uniforms.time, 1.5);
        assert_eq!(uniforms.time_delta, 0.5);
        uniforms.update_time(TimeSample::new(1.2, 2));
        assert_eq!(uniforms.time, 1.5);
        assert_eq!(uniforms.time_delta, 0.0);
        assert_eq!(uniforms.frame, 2);
    }

    #[test]
    fn bound_set_tracks_optional_uniforms() {
        let base = FrameUniforms::new(2, 2);
        assert_eq!(base.bound(), UniformSet::RESOLUTION | UniformSet::TIME);
        let full = base.with_fade(0.5).with_mouse(Vec2::ONE);
        assert!(full.bound().contains(UniformSet::FADE | UniformSet::MOUSE));
    }

    #[test]
    fn reports_missing_uniform_names() {
        let required = UniformSet::RESOLUTION | UniformSet::TIME | UniformSet::FADE;
        let bound = UniformSet::RESOLUTION | UniformSet::TIME;
        let missing = required.missing_from(bound);
        assert_eq!(missing, UniformSet::FADE);
        assert_eq!(missing.to_string(), "fade");
        assert!(required.missing_from(required).is_empty());
        assert_eq!(UniformSet::EMPTY.to_string(), "none");
    }
}
