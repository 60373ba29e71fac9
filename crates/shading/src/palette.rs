use std::f32::consts::TAU;

use glam::Vec3;
use sceneconfig::PaletteTable;

use crate::math::cos3;

/// Cosine color cycle: `bias + amplitude * cos(2π * (frequency * t + phase))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bias: Vec3,
    pub amplitude: Vec3,
    pub frequency: Vec3,
    pub phase: Vec3,
}

impl Palette {
    /// Blue/teal cycle of the twin-ring scenes.
    pub const TWIN_RINGS: Palette = Palette {
        bias: Vec3::new(0.072, 0.131, 0.531),
        amplitude: Vec3::new(0.009, 0.840, 0.177),
        frequency: Vec3::new(0.252, 0.541, 0.462),
        phase: Vec3::new(3.268, 2.475, 1.847),
    };

    /// Warm cycle blended into the highlight rhombus.
    pub const HIGHLIGHT: Palette = Palette {
        bias: Vec3::new(0.5, 0.5, 0.5),
        amplitude: Vec3::new(0.5, 0.5, 0.5),
        frequency: Vec3::new(1.0, 1.0, 0.5),
        phase: Vec3::new(0.8, 0.9, 0.3),
    };

    /// Rainbow cycle sampled along the tunnel radius.
    pub const TUNNEL: Palette = Palette {
        bias: Vec3::new(0.5, 0.5, 0.5),
        amplitude: Vec3::new(0.5, 0.5, 0.5),
        frequency: Vec3::new(1.0, 1.0, 1.0),
        phase: Vec3::new(0.263, 0.416, 0.557),
    };

    /// Builds a palette, rejecting non-finite coefficients.
    pub fn new(bias: Vec3, amplitude: Vec3, frequency: Vec3, phase: Vec3) -> Option<Self> {
        let palette = Self {
            bias,
            amplitude,
            frequency,
            phase,
        };
        palette.is_finite().then_some(palette)
    }

    pub fn from_table(table: &PaletteTable) -> Option<Self> {
        Self::new(
            Vec3::from_array(table.bias),
            Vec3::from_array(table.amplitude),
            Vec3::from_array(table.frequency),
            Vec3::from_array(table.phase),
        )
    }

    pub fn sample(&self, t: f32) -> Vec3 {
        self.bias + self.amplitude * cos3(TAU * (self.frequency * t + self.phase))
    }

    /// Copy of the palette with one channel's frequency multiplied by `factor`.
    pub fn with_scaled_frequency(&self, channel: usize, factor: f32) -> Self {
        let mut scaled = *self;
        if channel < 3 {
            scaled.frequency[channel] *= factor;
        }
        scaled
    }

    /// Componentwise lower and upper bound of every sample.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let reach = self.amplitude.abs();
        (self.bias - reach, self.bias + reach)
    }

    fn is_finite(&self) -> bool {
        self.bias.is_finite()
            && self.amplitude.is_finite()
            && self.frequency.is_finite()
            && self.phase.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sample_is_periodic_per_channel() {
        let palette = Palette::TWIN_RINGS;
        for channel in 0..3 {
            let period = 1.0 / palette.frequency[channel];
            for t in [0.0_f32, 0.37, 1.5, -2.25] {
                let a = palette.sample(t)[channel];
                let b = palette.sample(t + period)[channel];
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn sample_stays_within_bounds() {
        let (low, high) = Palette::TWIN_RINGS.bounds();
        for step in -200..200 {
            let color = Palette::TWIN_RINGS.sample(step as f32 * 0.037);
            for channel in 0..3 {
                assert!(color[channel] >= low[channel] - 1e-6);
                assert!(color[channel] <= high[channel] + 1e-6);
            }
        }
    }

    #[test]
    fn sample_at_zero_uses_phase_only() {
        let palette = Palette::TUNNEL;
        let color = palette.sample(0.0);
        let expected = 0.5 + 0.5 * (TAU * 0.263_f32).cos();
        assert_abs_diff_eq!(color.x, expected, epsilon = 1e-6);
    }

    #[test]
    fn scaled_frequency_touches_one_channel() {
        let scaled = Palette::HIGHLIGHT.with_scaled_frequency(1, 0.0);
        assert_eq!(scaled.frequency, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(scaled.bias, Palette::HIGHLIGHT.bias);
        let constant = scaled.sample(0.3).y;
        assert_abs_diff_eq!(constant, scaled.sample(17.0).y, epsilon = 1e-6);
    }

    #[test]
    fn rejects_non_finite_coefficients() {
        assert!(Palette::new(Vec3::ZERO, Vec3::ONE, Vec3::ONE, Vec3::ZERO).is_some());
        assert!(Palette::new(Vec3::ZERO, Vec3::splat(f32::NAN), Vec3::ONE, Vec3::ZERO).is_none());
        let table = PaletteTable {
            bias: [0.5; 3],
            amplitude: [0.5; 3],
            frequency: [f32::INFINITY, 1.0, 1.0],
            phase: [0.0; 3],
        };
        assert!(Palette::from_table(&table).is_none());
    }
}
