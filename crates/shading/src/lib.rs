//! Procedural shading stages and the software host that drives them.
//!
//! A scene (built-in preset or TOML scene file) is compiled into a fragment
//! program, linked against the vertex stage its variant was authored for, and
//! then drawn over a full-screen quad once per frame. The overall flow is:
//!
//! ```text
//!   CLI / procshade
//!          │ RendererConfig + FragmentProgram
//!          ▼
//!   Renderer::run ──▶ link() ──▶ TimeSource ──▶ per-frame loop
//!                                                   │
//!                      UniformBindings::apply() ◀───┤
//!                      Rasterizer::render()     ◀───┤
//!                      export::write_png()      ◀───┘
//! ```
//!
//! The stages themselves live in [`scene`]; they are pure functions of the
//! fragment coordinate and [`FrameUniforms`], so the rasterizer is free to
//! evaluate pixels and sub-samples in any order.

pub mod export;
pub mod math;
pub mod palette;
pub mod program;
pub mod raster;
pub mod runtime;
pub mod scene;
pub mod sdf;
pub mod timeline;
pub mod types;
pub mod uniforms;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use image::Rgba32FImage;

pub use export::{encode_rgba8, frame_path, write_png, ExportError};
pub use palette::Palette;
pub use program::{
    compile_fragment, compile_preset, compile_scene, compile_source, link, parse_document,
    FragmentProgram, Program, ProgramError, SceneOverrides, UniformBindings, VertexStage,
};
pub use raster::{Rasterizer, CLEAR_COLOR, QUAD_POSITIONS};
pub use runtime::{time_source_for_policy, RenderPolicy, TimeSample, TimeSource};
pub use scene::{Evaluator, StageInterface, VertexLayout};
pub use types::{Antialiasing, ColorSpaceMode, RendererConfig};
pub use uniforms::{FrameUniforms, UniformSet};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Links `fragment` with the vertex stage its scene asks for at the
    /// configured aspect ratio, returning the program and the host bindings
    /// that satisfied it.
    pub fn link(&self, fragment: FragmentProgram) -> Result<(Program, UniformBindings), ProgramError> {
        let (width, height) = self.config.surface_size;
        let aspect = width as f32 / height.max(1) as f32;
        let vertex = VertexStage::for_entry(fragment.entry(), aspect);
        let bindings = fragment.bindings();
        let program = link(vertex, fragment, bindings.bound())?;
        Ok((program, bindings))
    }

    /// Renders a single frame at `seconds` without touching the filesystem.
    pub fn render_at(&self, program: &Program, bindings: &UniformBindings, seconds: f32) -> Rgba32FImage {
        let (width, height) = self.config.surface_size;
        let mut uniforms = FrameUniforms::new(width, height).with_time(seconds);
        bindings.apply(&mut uniforms);
        let mut frame = Rgba32FImage::new(width, height);
        Rasterizer::new(self.config.antialiasing).render(program, &uniforms, &mut frame);
        frame
    }

    /// Renders every frame the policy asks for and writes them to disk.
    ///
    /// Returns the paths written, in frame order.
    pub fn run(&self, fragment: FragmentProgram) -> Result<Vec<PathBuf>> {
        let (width, height) = self.config.surface_size;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyFrame { width, height }.into());
        }

        let frames = self.config.policy.frame_count();
        if frames == 0 {
            bail!("nothing to render: frame count is zero");
        }

        let (program, bindings) = self.link(fragment)?;
        let mut clock = time_source_for_policy(&self.config.policy)?;
        let pacing = self.config.policy.frame_interval();
        let rasterizer = Rasterizer::new(self.config.antialiasing);

        // Start the clock at the first frame.
        clock.reset();
        tracing::info!(
            scene = program.name(),
            variant = %program.fragment().entry().variant,
            width,
            height,
            frames,
            samples = rasterizer.samples_per_pixel(),
            "rendering"
        );

        let mut uniforms = FrameUniforms::new(width, height);
        let mut frame = Rgba32FImage::new(width, height);
        let mut written = Vec::with_capacity(frames as usize);
        let mut deadline = Instant::now();

        for index in 0..frames {
            if let Some(interval) = pacing {
                wait_until(deadline);
                deadline = deadline.max(Instant::now()) + interval;
            }

            uniforms.update_time(clock.sample());
            bindings.apply(&mut uniforms);

            let started = Instant::now();
            let covered = rasterizer.render(&program, &uniforms, &mut frame);
            let path = frame_path(&self.config.output, index, frames);
            write_png(&frame, self.config.color_space, &path)
                .with_context(|| format!("failed to export frame {index}"))?;

            tracing::debug!(
                frame = index,
                time = uniforms.time,
                fade = ?uniforms.fade,
                covered,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                path = %path.display(),
                "frame exported"
            );
            written.push(path);
        }

        tracing::info!(frames = written.len(), "render complete");
        Ok(written)
    }
}

fn wait_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}
