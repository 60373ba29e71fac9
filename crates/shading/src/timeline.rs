use std::time::Duration;

use sceneconfig::FadeCurve;

use crate::math;

/// Easing shape applied to fade progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeCurve {
    Linear,
    #[default]
    Smoothstep,
    EaseInOut,
}

impl From<FadeCurve> for CrossfadeCurve {
    fn from(curve: FadeCurve) -> Self {
        match curve {
            FadeCurve::Linear => CrossfadeCurve::Linear,
            FadeCurve::Smoothstep => CrossfadeCurve::Smoothstep,
            FadeCurve::EaseInOut => CrossfadeCurve::EaseInOut,
        }
    }
}

impl CrossfadeCurve {
    /// Eased progress for `t`, clamped to `[0, 1]`.
    fn ease(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            CrossfadeCurve::Linear => t,
            CrossfadeCurve::Smoothstep => math::smoothstep(0.0, 1.0, t),
            CrossfadeCurve::EaseInOut if t < 0.5 => 2.0 * t * t,
            CrossfadeCurve::EaseInOut => 1.0 - 2.0 * (1.0 - t) * (1.0 - t),
        }
    }
}

/// Fade-in from black over `duration`, measured on the frame clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    duration: Duration,
    curve: CrossfadeCurve,
}

impl FadeEnvelope {
    pub fn new(duration: Duration, curve: CrossfadeCurve) -> Option<Self> {
        if duration.is_zero() {
            None
        } else {
            Some(Self { duration, curve })
        }
    }

    /// Fade level at `seconds`, in `[0, 1]`.
    pub fn level(&self, seconds: f32) -> f32 {
        let progress = seconds.max(0.0) / self.duration.as_secs_f32().max(f32::EPSILON);
        self.curve.ease(progress)
    }
}

/// Where the `fade` uniform comes from, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FadeSource {
    #[default]
    Unbound,
    Constant(f32),
    Envelope(FadeEnvelope),
}

impl FadeSource {
    pub fn sample(&self, seconds: f32) -> Option<f32> {
        match self {
            FadeSource::Unbound => None,
            FadeSource::Constant(level) => Some(level.clamp(0.0, 1.0)),
            FadeSource::Envelope(envelope) => Some(envelope.level(seconds)),
        }
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self, FadeSource::Unbound)
    }
}
