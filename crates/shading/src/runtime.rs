use std::time::{Duration, Instant};

use anyhow::{bail, Result};

/// How many frames to render and where their timestamps come from.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// One frame at `time` seconds.
    Still { time: f32 },
    /// `frames` frames at `start + index / fps` seconds.
    Sequence { fps: f32, frames: u32, start: f32 },
    /// `frames` frames stamped with elapsed wall-clock time, paced to
    /// `target_fps` when set.
    Animate {
        target_fps: Option<f32>,
        frames: u32,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Still { time: 0.0 }
    }
}

impl RenderPolicy {
    pub fn frame_count(&self) -> u32 {
        match self {
            RenderPolicy::Still { .. } => 1,
            RenderPolicy::Sequence { frames, .. } | RenderPolicy::Animate { frames, .. } => {
                *frames
            }
        }
    }

    /// Wall-clock spacing between paced frames.
    pub fn frame_interval(&self) -> Option<Duration> {
        match self {
            RenderPolicy::Animate {
                target_fps: Some(fps),
                ..
            } if *fps > 0.0 => Some(Duration::from_secs_f32(1.0 / fps)),
            _ => None,
        }
    }
}

/// Timestamp handed to the uniforms for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    pub seconds: f32,
    /// Zero for the first frame of a run.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Frame clock owned by the host. Stages only ever read its samples.
pub trait TimeSource: Send {
    /// Rewinds to frame zero.
    fn reset(&mut self);
    /// Timestamp for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Seconds elapsed since construction (or the last reset).
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    started: Instant,
    next_frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            next_frame: 0,
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn sample(&mut self) -> TimeSample {
        let index = self.next_frame;
        self.next_frame += 1;
        TimeSample::new(self.started.elapsed().as_secs_f32(), index)
    }
}

/// Reports the same timestamp for every frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    seconds: f32,
    next_frame: u64,
}

impl FixedTimeSource {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            next_frame: 0,
        }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.next_frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let index = self.next_frame;
        self.next_frame += 1;
        TimeSample::new(self.seconds, index)
    }
}

/// Deterministic clock advancing by `1 / fps` per sample.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    start: f32,
    fps: f32,
    frame: u64,
}

impl SteppedTimeSource {
    pub fn new(start: f32, fps: f32) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            bail!("frame rate must be positive (got {fps})");
        }
        Ok(Self {
            start,
            fps,
            frame: 0,
        })
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let seconds = self.start + (self.frame as f64 / self.fps as f64) as f32;
        let index = self.frame;
        self.frame += 1;
        TimeSample::new(seconds, index)
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource>;

/// The clock a policy's frames are stamped with.
pub fn time_source_for_policy(policy: &RenderPolicy) -> Result<BoxedTimeSource> {
    match policy {
        RenderPolicy::Still { time } => Ok(Box::new(FixedTimeSource::new(*time))),
        RenderPolicy::Sequence { fps, start, .. } => {
            Ok(Box::new(SteppedTimeSource::new(*start, *fps)?))
        }
        RenderPolicy::Animate { .. } => Ok(Box::new(SystemTimeSource::new())),
    }
}
