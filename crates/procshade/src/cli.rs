use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sceneconfig::VariantKind;
use shading::{Antialiasing, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "procshade",
    author,
    version,
    about = "Render procedural shading scenes to PNG",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options that pick a scene and the uniforms it is evaluated with.
#[derive(Args, Debug, Clone, Default)]
pub struct SceneArgs {
    /// Scene name from `--scene-file`, or a variant name (`twin-rings`, `highlight`, `tunnel`).
    #[arg(value_name = "SCENE")]
    pub scene: Option<String>,

    /// TOML scene document to load scenes and defaults from.
    #[arg(long, value_name = "FILE", env = "PROCSHADE_SCENE_FILE")]
    pub scene_file: Option<PathBuf>,

    /// Force the shading variant, overriding the scene's own.
    #[arg(long, value_name = "NAME", value_parser = parse_variant)]
    pub variant: Option<VariantKind>,

    /// Output resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = sceneconfig::parse_size)]
    pub size: Option<(u32, u32)>,

    /// Timestamp in seconds for stills, or the start time of a sequence.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    /// Constant fade level in `[0, 1]`.
    #[arg(long, value_name = "VALUE", value_parser = parse_fade, conflicts_with = "fade_in")]
    pub fade: Option<f32>,

    /// Fade in from black over the given duration (`2s`, `1.5`, `500ms`).
    #[arg(long, value_name = "DURATION", value_parser = sceneconfig::parse_duration)]
    pub fade_in: Option<Duration>,

    /// Pointer position in pixels, bottom-left origin (e.g. `320,180`).
    #[arg(long, value_name = "X,Y", value_parser = parse_mouse)]
    pub mouse: Option<[f32; 2]>,

    /// Anti-aliasing policy: `auto`, `off`, or a sample count (2/4/8/16).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Number of frames to render; more than one produces a sequence.
    #[arg(long, value_name = "N")]
    pub frames: Option<u32>,

    /// Frame rate of a sequence, or the pacing target with `--realtime`.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Time frames with the wall clock instead of stepping deterministically.
    #[arg(long)]
    pub realtime: bool,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// PNG path; `{frame}` is replaced by the frame index in sequences.
    #[arg(short, long, value_name = "PATH", default_value = "procshade.png")]
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the shading variants and the uniforms each one reads.
    Variants,
    /// Print the RGBA value the fragment stage produces at one pixel.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Horizontal pixel coordinate, measured from the left edge.
    #[arg(long, value_name = "X", allow_negative_numbers = true)]
    pub x: f32,

    /// Vertical pixel coordinate, measured from the bottom edge.
    #[arg(long, value_name = "Y", allow_negative_numbers = true)]
    pub y: f32,

    #[command(flatten)]
    pub scene: SceneArgs,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_variant(value: &str) -> Result<VariantKind, String> {
    value.parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    if value.trim().is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }
    sceneconfig::parse_antialias(value)
        .map(Antialiasing::from)
        .map_err(|err| format!("{err}; use auto/off or 2/4/8/16"))
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_fade(value: &str) -> Result<f32, String> {
    let fade: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fade '{value}'; expected a number in [0, 1]"))?;
    if !(0.0..=1.0).contains(&fade) {
        return Err(format!("fade {fade} is outside [0, 1]"));
    }
    Ok(fade)
}

pub fn parse_mouse(value: &str) -> Result<[f32; 2], String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("invalid mouse position '{value}'; expected X,Y"))?;
    let parse = |axis: &str, raw: &str| {
        raw.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid {axis} coordinate '{}' in mouse position", raw.trim()))
    };
    Ok([parse("x", x)?, parse("y", y)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("OFF").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("8").unwrap(), Antialiasing::Samples(8));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_mouse_and_fade() {
        assert_eq!(parse_mouse("320, 180.5").unwrap(), [320.0, 180.5]);
        assert!(parse_mouse("320").is_err());
        assert!(parse_mouse("a,b").is_err());
        assert_eq!(parse_fade("0.25").unwrap(), 0.25);
        assert!(parse_fade("1.5").is_err());
    }

    #[test]
    fn fade_and_fade_in_conflict() {
        let result = Cli::try_parse_from(["procshade", "--fade", "1", "--fade-in", "2s"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_sequence_invocation() {
        let cli = Cli::try_parse_from([
            "procshade",
            "tunnel",
            "--size",
            "64x32",
            "--frames",
            "4",
            "--fps",
            "12",
            "--output",
            "out/{frame}.png",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.scene.scene.as_deref(), Some("tunnel"));
        assert_eq!(cli.run.scene.size, Some((64, 32)));
        assert_eq!(cli.run.frames, Some(4));
        assert_eq!(cli.run.output, PathBuf::from("out/{frame}.png"));
        assert_eq!(cli.run.color_space, ColorSpaceMode::Auto);
    }

    #[test]
    fn parses_probe_subcommand() {
        let cli = Cli::try_parse_from([
            "procshade", "probe", "--x", "10", "--y", "-2", "--variant", "highlight",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Probe(args)) => {
                assert_eq!((args.x, args.y), (10.0, -2.0));
                assert_eq!(args.scene.variant, Some(VariantKind::Highlight));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
