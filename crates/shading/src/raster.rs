use glam::{Vec2, Vec4};
use image::{Rgba, Rgba32FImage};

use crate::math::EPSILON;
use crate::program::Program;
use crate::types::Antialiasing;
use crate::uniforms::FrameUniforms;

/// Full-screen quad as a triangle strip.
pub const QUAD_POSITIONS: [Vec2; 4] = [
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, -1.0),
];

const QUAD_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [2, 1, 3]];

/// Opaque black, written to every pixel before the quad is drawn.
pub const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Triangle in window coordinates (pixels, bottom-left origin).
#[derive(Debug, Clone, Copy)]
struct ScreenTriangle {
    vertices: [Vec2; 3],
    area: f32,
}

impl ScreenTriangle {
    fn new(vertices: [Vec2; 3]) -> Option<Self> {
        let [a, b, c] = vertices;
        let area = edge(a, b, c);
        if area.abs() < EPSILON {
            return None;
        }
        Some(Self { vertices, area })
    }

    fn covers(&self, p: Vec2) -> bool {
        let [a, b, c] = self.vertices;
        [edge(a, b, p), edge(b, c, p), edge(c, a, p)]
            .into_iter()
            .all(|e| e * self.area >= 0.0)
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Software stand-in for the GPU draw: transforms the static quad through the
/// program's vertex stage and shades every covered pixel with its fragment
/// stage.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    vertices: [Vec2; 4],
    sample_offsets: Vec<Vec2>,
}

impl Rasterizer {
    pub fn new(antialiasing: Antialiasing) -> Self {
        let (cols, rows) = antialiasing.sample_grid();
        let sample_offsets = (0..rows)
            .flat_map(|row| {
                (0..cols).map(move |col| {
                    Vec2::new(
                        (col as f32 + 0.5) / cols as f32,
                        (row as f32 + 0.5) / rows as f32,
                    )
                })
            })
            .collect();
        Self {
            vertices: QUAD_POSITIONS,
            sample_offsets,
        }
    }

    pub fn samples_per_pixel(&self) -> usize {
        self.sample_offsets.len()
    }

    /// Clears `target` and draws the quad into it. Returns the number of
    /// pixels the quad touched.
    pub fn render(&self, program: &Program, uniforms: &FrameUniforms, target: &mut Rgba32FImage) -> u64 {
        let (width, height) = target.dimensions();
        for pixel in target.pixels_mut() {
            *pixel = Rgba(CLEAR_COLOR.to_array());
        }
        if width == 0 || height == 0 {
            return 0;
        }

        let size = Vec2::new(width as f32, height as f32);
        let triangles: Vec<ScreenTriangle> = QUAD_TRIANGLES
            .into_iter()
            .filter_map(|indices| {
                let clip = indices.map(|i| program.vertex().to_clip(self.vertices[i]));
                if clip.iter().any(|c| c.w <= EPSILON) {
                    tracing::debug!("skipping triangle behind the camera");
                    return None;
                }
                ScreenTriangle::new(clip.map(|c| (c.truncate().truncate() / c.w + Vec2::ONE) * 0.5 * size))
            })
            .collect();
        if triangles.is_empty() {
            return 0;
        }

        let (min, max) = triangles
            .iter()
            .flat_map(|t| t.vertices)
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(height);

        let evaluator = program.evaluator();
        let samples = self.sample_offsets.len() as f32;
        let mut covered_pixels = 0;

        for y in y0..y1 {
            for x in x0..x1 {
                let corner = Vec2::new(x as f32, y as f32);
                let mut accumulated = Vec4::ZERO;
                let mut covered = false;
                for offset in &self.sample_offsets {
                    let frag_coord = corner + *offset;
                    if triangles.iter().any(|t| t.covers(frag_coord)) {
                        accumulated += evaluator.evaluate(frag_coord, uniforms);
                        covered = true;
                    } else {
                        accumulated += CLEAR_COLOR;
                    }
                }
                if !covered {
                    continue;
                }
                // Window rows grow upwards; image rows grow downwards.
                target.put_pixel(x, height - 1 - y, Rgba((accumulated / samples).to_array()));
                covered_pixels += 1;
            }
        }

        covered_pixels
    }
}
