use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const SCENES: &str = r#"
version = 1

[defaults]
scene = "deep"
size = "24x16"
antialias = "off"

[scenes.deep]
variant = "tunnel"
fade_in = "1s"

[scenes.bare-glow]
variant = "highlight"

[scenes.rings]
variant = "twin-rings"
fade = 0.5

[scenes.rings.rings]
guide = { from = [-0.5, 0.0], to = [0.5, 0.0] }
"#;

fn procshade(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_procshade"))
        .current_dir(dir.path())
        .env_remove("PROCSHADE_SCENE_FILE")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run procshade")
}

fn write_scenes(dir: &TempDir) {
    fs::write(dir.path().join("scenes.toml"), SCENES).unwrap();
}

#[test]
fn renders_default_still_into_working_directory() {
    let dir = TempDir::new().unwrap();
    let output = procshade(&dir, &["--size", "16x9", "--antialias", "off"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let path = dir.path().join("procshade.png");
    assert!(path.exists());
    assert!(fs::metadata(&path).unwrap().len() > 0);
    assert!(String::from_utf8_lossy(&output.stdout).contains("procshade.png"));
}

#[test]
fn renders_numbered_sequence_from_scene_file() {
    let dir = TempDir::new().unwrap();
    write_scenes(&dir);
    let output = procshade(
        &dir,
        &[
            "--scene-file",
            "scenes.toml",
            "--frames",
            "3",
            "--fps",
            "8",
            "--output",
            "frames/deep-{frame}.png",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    for index in 0..3 {
        let path = dir.path().join(format!("frames/deep-{index:04}.png"));
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn malformed_scene_file_fails_with_compile_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.toml"), "version = 1\n[scenes.x]\nvariant = \"plasma\"\n")
        .unwrap();
    let output = procshade(&dir, &["--scene-file", "broken.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to compile"), "stderr: {stderr}");
    assert!(!dir.path().join("procshade.png").exists());
}

#[test]
fn highlight_without_fade_fails_to_link() {
    let dir = TempDir::new().unwrap();
    write_scenes(&dir);
    let output = procshade(&dir, &["--scene-file", "scenes.toml", "bare-glow"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to link"), "stderr: {stderr}");
    assert!(stderr.contains("fade"), "stderr: {stderr}");

    let output = procshade(
        &dir,
        &["--scene-file", "scenes.toml", "bare-glow", "--fade", "0.8"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn lists_variants_with_their_interfaces() {
    let dir = TempDir::new().unwrap();
    let output = procshade(&dir, &["variants"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("twin-rings") && rows[0].contains("passthrough"));
    assert!(rows[1].starts_with("highlight") && rows[1].contains("fade"));
    assert!(rows[2].starts_with("tunnel") && rows[2].contains("mouse"));
}

#[test]
fn probe_prints_opaque_rgba() {
    let dir = TempDir::new().unwrap();
    write_scenes(&dir);

    let output = procshade(
        &dir,
        &["probe", "--x", "12.5", "--y", "8.5", "--scene-file", "scenes.toml", "rings"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let channels: Vec<f32> = stdout
        .split_whitespace()
        .map(|value| value.parse().unwrap())
        .collect();
    assert_eq!(channels.len(), 4);
    assert!(channels.iter().all(|c| c.is_finite()));
    assert_eq!(channels[3], 1.0);

    // The default scene fades in from black over one second.
    let output = procshade(
        &dir,
        &["probe", "--x", "3", "--y", "3", "--scene-file", "scenes.toml"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let channels: Vec<f32> = String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .map(|value| value.parse().unwrap())
        .collect();
    assert_eq!(channels, [0.0, 0.0, 0.0, 1.0]);
}
