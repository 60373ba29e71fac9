use std::path::PathBuf;

use sceneconfig::AntialiasSetting;

use crate::runtime::RenderPolicy;

/// Output color handling for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`: the scenes were authored against a gamma-encoded canvas.
    #[default]
    Auto,
    /// Stage output is written to 8-bit channels unchanged.
    Gamma,
    /// Stage output is linear and gets sRGB-encoded on export.
    Linear,
}

/// Supersampling policy for the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Four samples per pixel.
    #[default]
    Auto,
    /// One sample at the pixel center.
    Off,
    /// Explicit sample count; 2, 4, 8 or 16.
    Samples(u32),
}

impl Antialiasing {
    /// Columns and rows of the per-pixel sample grid.
    pub fn sample_grid(self) -> (u32, u32) {
        match self {
            Antialiasing::Off => (1, 1),
            Antialiasing::Auto => (2, 2),
            Antialiasing::Samples(n) => match n {
                0 | 1 => (1, 1),
                2 => (2, 1),
                3 | 4 => (2, 2),
                5..=8 => (4, 2),
                _ => (4, 4),
            },
        }
    }

    pub fn samples_per_pixel(self) -> u32 {
        let (cols, rows) = self.sample_grid();
        cols * rows
    }
}

impl From<AntialiasSetting> for Antialiasing {
    fn from(setting: AntialiasSetting) -> Self {
        match setting {
            AntialiasSetting::Auto => Antialiasing::Auto,
            AntialiasSetting::Off => Antialiasing::Off,
            AntialiasSetting::Samples2 => Antialiasing::Samples(2),
            AntialiasSetting::Samples4 => Antialiasing::Samples(4),
            AntialiasSetting::Samples8 => Antialiasing::Samples(8),
            AntialiasSetting::Samples16 => Antialiasing::Samples(16),
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer how large the
/// frames are, how time advances, and where the frames go.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Frame size in pixels.
    pub surface_size: (u32, u32),
    /// Destination file; multi-frame runs expand `{frame}` or gain a suffix.
    pub output: PathBuf,
    pub policy: RenderPolicy,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
}

impl Default for RendererConfig {
    /// A single 720p still at time zero written to `procshade.png`.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            output: PathBuf::from("procshade.png"),
            policy: RenderPolicy::default(),
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_grids_match_requested_counts() {
        assert_eq!(Antialiasing::Off.samples_per_pixel(), 1);
        assert_eq!(Antialiasing::Auto.samples_per_pixel(), 4);
        for n in [2, 4, 8, 16] {
            assert_eq!(Antialiasing::Samples(n).samples_per_pixel(), n);
        }
        assert_eq!(
            Antialiasing::from(AntialiasSetting::Samples8),
            Antialiasing::Samples(8)
        );
    }
}
