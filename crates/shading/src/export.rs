use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, Rgba32FImage, RgbaImage};

use crate::types::ColorSpaceMode;

/// Placeholder replaced by the zero-padded frame index in output paths.
pub const FRAME_PLACEHOLDER: &str = "{frame}";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("refusing to export an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Quantizes a float frame to 8 bits per channel.
///
/// Channels are clamped to `[0, 1]`; NaN becomes zero. In `Linear` mode the
/// color channels are sRGB-encoded first. Alpha is never encoded.
pub fn encode_rgba8(frame: &Rgba32FImage, color_space: ColorSpaceMode) -> RgbaImage {
    let encode: fn(f32) -> f32 = match color_space {
        ColorSpaceMode::Auto | ColorSpaceMode::Gamma => |c| c,
        ColorSpaceMode::Linear => linear_to_srgb,
    };
    RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        Rgba([
            quantize(encode(r)),
            quantize(encode(g)),
            quantize(encode(b)),
            quantize(a),
        ])
    })
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn quantize(c: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Path for frame `index` of a `total`-frame run.
///
/// `{frame}` in the file name is replaced by the index padded to four digits.
/// Without the placeholder, single-frame runs use `output` verbatim and longer
/// runs gain a `_NNNN` suffix before the extension.
pub fn frame_path(output: &Path, index: u32, total: u32) -> PathBuf {
    let text = output.to_string_lossy();
    if text.contains(FRAME_PLACEHOLDER) {
        return PathBuf::from(text.replace(FRAME_PLACEHOLDER, &format!("{index:04}")));
    }
    if total <= 1 {
        return output.to_path_buf();
    }

    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{index:04}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index:04}"),
    };
    output.with_file_name(name)
}

/// Encodes `frame` and writes it to `path` as PNG, creating parent
/// directories as needed.
pub fn write_png(
    frame: &Rgba32FImage,
    color_space: ColorSpaceMode,
    path: &Path,
) -> Result<(), ExportError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ExportError::EmptyFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    encode_rgba8(frame, color_space)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "wrote frame");
    Ok(())
}
