use std::fs;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use sceneconfig::{Defaults, SceneDocument, SceneEntry, VariantKind};
use shading::{
    compile_fragment, compile_preset, compile_scene, parse_document, FragmentProgram,
    FrameUniforms, RenderPolicy, Renderer, RendererConfig, SceneOverrides, StageInterface,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{ProbeArgs, RunArgs, SceneArgs};

const FALLBACK_SIZE: (u32, u32) = (1280, 720);
const FALLBACK_FPS: f32 = 30.0;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A compiled scene plus the document-level defaults it was loaded with.
struct ResolvedScene {
    fragment: FragmentProgram,
    defaults: Defaults,
}

pub fn run(args: RunArgs) -> Result<()> {
    let resolved = resolve_scene(&args.scene)?;
    let config = renderer_config(&args, &resolved.defaults)?;
    tracing::debug!(?config, "resolved renderer configuration");

    let renderer = Renderer::new(config);
    let written = renderer.run(resolved.fragment)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

pub fn list_variants() -> Result<()> {
    println!("{:<12} {:<12} {:<26} optional", "variant", "vertex", "required");
    for variant in VariantKind::ALL {
        let interface = StageInterface::for_variant(variant);
        println!(
            "{:<12} {:<12} {:<26} {}",
            variant.as_str(),
            interface.vertex.to_string(),
            interface.required.to_string(),
            interface.optional
        );
    }
    Ok(())
}

pub fn probe(args: ProbeArgs) -> Result<()> {
    let resolved = resolve_scene(&args.scene)?;
    let (width, height) = args
        .scene
        .size
        .or(resolved.defaults.size)
        .unwrap_or(FALLBACK_SIZE);

    let renderer = Renderer::new(RendererConfig {
        surface_size: (width, height),
        ..RendererConfig::default()
    });
    let (program, bindings) = renderer.link(resolved.fragment)?;

    let mut uniforms = FrameUniforms::new(width, height).with_time(args.scene.time.unwrap_or(0.0));
    bindings.apply(&mut uniforms);
    let color = program
        .evaluator()
        .evaluate(Vec2::new(args.x, args.y), &uniforms);

    tracing::debug!(scene = program.name(), x = args.x, y = args.y, "probed pixel");
    println!(
        "{:.6} {:.6} {:.6} {:.6}",
        color.x, color.y, color.z, color.w
    );
    Ok(())
}

fn overrides(args: &SceneArgs) -> SceneOverrides {
    SceneOverrides {
        fade: args.fade,
        fade_in: args.fade_in,
        fade_curve: None,
        mouse: args.mouse,
    }
}

/// Layers built-in presets, the scene file and command-line flags, in that
/// order, and compiles the result.
fn resolve_scene(args: &SceneArgs) -> Result<ResolvedScene> {
    let overrides = overrides(args);

    let Some(path) = &args.scene_file else {
        let variant = match (&args.scene, args.variant) {
            (_, Some(variant)) => variant,
            (Some(name), None) => name
                .parse::<VariantKind>()
                .map_err(anyhow::Error::msg)
                .context("without --scene-file the scene must name a variant")?,
            (None, None) => VariantKind::TwinRings,
        };
        tracing::info!(variant = %variant, "using built-in preset");
        return Ok(ResolvedScene {
            fragment: compile_preset(variant, &overrides)?,
            defaults: Defaults::default(),
        });
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file {}", path.display()))?;
    let document = parse_document(&source)
        .with_context(|| format!("failed to load scene file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        scenes = document.scenes.len(),
        "loaded scene document"
    );

    let fragment = match args.variant {
        None => compile_scene(&document, args.scene.as_deref(), &overrides)?,
        Some(variant) => {
            let (name, entry) = select_entry(&document, args.scene.as_deref())?;
            let mut entry = entry.clone();
            entry.variant = variant;
            overrides.apply(&mut entry);
            compile_fragment(name, &entry)?
        }
    };

    Ok(ResolvedScene {
        fragment,
        defaults: document.defaults,
    })
}

fn select_entry<'a>(
    document: &'a SceneDocument,
    scene: Option<&str>,
) -> Result<(&'a str, &'a SceneEntry)> {
    document
        .select(scene)
        .map_err(|err| anyhow::anyhow!("failed to select scene: {err}"))
}

fn renderer_config(args: &RunArgs, defaults: &Defaults) -> Result<RendererConfig> {
    let surface_size = args.scene.size.or(defaults.size).unwrap_or(FALLBACK_SIZE);
    let fps = args.fps.or(defaults.fps);
    if let Some(fps) = fps {
        if !fps.is_finite() || fps <= 0.0 {
            bail!("--fps must be greater than zero (got {fps})");
        }
    }

    let policy = match (args.realtime, args.frames) {
        (_, Some(0)) => bail!("--frames must be at least 1"),
        (true, frames) => RenderPolicy::Animate {
            target_fps: fps,
            frames: frames.unwrap_or(1),
        },
        (false, Some(frames)) if frames > 1 => RenderPolicy::Sequence {
            fps: fps.unwrap_or(FALLBACK_FPS),
            frames,
            start: args.scene.time.unwrap_or(0.0),
        },
        (false, _) => RenderPolicy::Still {
            time: args.scene.time.unwrap_or(0.0),
        },
    };

    let antialiasing = args
        .scene
        .antialias
        .or(defaults.antialias.map(Into::into))
        .unwrap_or_default();

    Ok(RendererConfig {
        surface_size,
        output: args.output.clone(),
        policy,
        antialiasing,
        color_space: args.color_space,
    })
}
