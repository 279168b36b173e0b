//! Static gradient fallback under the GPU layer.
//!
//! The haze is always part of the composition: when the pillar session is
//! live it sits underneath as faint atmosphere, and when the session never
//! mounts it is the whole backdrop. Because it exists unconditionally, the
//! renderer never has to signal failure through shared state; the caller
//! simply keeps the haze at `haze_opacity * opacity` strength.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

use crate::types::PillarParams;

/// One soft elliptical glow. `center` is a fraction of the target size,
/// `radius` is in pixels, and coverage fades linearly to zero at
/// `FADE_EXTENT` of the radius, matching the layered-gradient look the
/// backdrop was designed around.
#[derive(Debug, Clone, Copy)]
struct RadialLayer {
    center: (f32, f32),
    radius: (f32, f32),
    color: [f32; 3],
    alpha: f32,
}

const FADE_EXTENT: f32 = 0.6;

impl RadialLayer {
    fn coverage(&self, x: f32, y: f32, width: f32, height: f32) -> f32 {
        let cx = self.center.0 * width;
        let cy = self.center.1 * height;
        let dx = (x - cx) / self.radius.0;
        let dy = (y - cy) / self.radius.1;
        let dist = (dx * dx + dy * dy).sqrt();
        self.alpha * (1.0 - dist / FADE_EXTENT).clamp(0.0, 1.0)
    }
}

/// The three-layer gradient haze for one scene.
#[derive(Debug, Clone)]
pub struct HazeLayer {
    layers: [RadialLayer; 3],
    opacity: f32,
}

impl HazeLayer {
    /// Derives the haze from the same parameters that drive the GPU layer:
    /// the two scene colors as side glows plus a neutral center wash.
    pub fn from_params(params: &PillarParams) -> Self {
        let opacity = params.haze_opacity.clamp(0.0, 1.0) * params.opacity.clamp(0.0, 1.0);
        Self {
            layers: [
                RadialLayer {
                    center: (0.30, 0.25),
                    radius: (900.0, 500.0),
                    color: params.top_color,
                    alpha: 0.10,
                },
                RadialLayer {
                    center: (0.70, 0.25),
                    radius: (900.0, 500.0),
                    color: params.bottom_color,
                    alpha: 0.10,
                },
                RadialLayer {
                    center: (0.50, 0.70),
                    radius: (1100.0, 700.0),
                    color: [1.0, 1.0, 1.0],
                    alpha: 0.05,
                },
            ],
            opacity,
        }
    }

    /// Overall layer strength: exactly `haze_opacity * opacity`.
    pub fn effective_opacity(&self) -> f32 {
        self.opacity
    }

    /// Renders the haze to an RGBA bitmap for hosts without a GPU path.
    pub fn rasterize(&self, width: u32, height: u32) -> RgbaImage {
        let width = width.max(1);
        let height = height.max(1);
        let (w, h) = (width as f32, height as f32);

        RgbaImage::from_fn(width, height, |px, py| {
            let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
            let mut rgb = [0.0f32; 3];
            let mut alpha = 0.0f32;
            for layer in &self.layers {
                let a = layer.coverage(x, y, w, h);
                for (dst, src) in rgb.iter_mut().zip(layer.color) {
                    *dst = *dst * (1.0 - a) + src * a;
                }
                alpha = alpha * (1.0 - a) + a;
            }
            alpha *= self.opacity;

            let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([
                to_byte(rgb[0]),
                to_byte(rgb[1]),
                to_byte(rgb[2]),
                to_byte(alpha),
            ])
        })
    }

    /// Rasterizes and writes a PNG, for the viewer's no-GPU path.
    pub fn write_png(&self, path: &Path, width: u32, height: u32) -> Result<()> {
        self.rasterize(width, height)
            .save(path)
            .with_context(|| format!("failed to write haze fallback to {}", path.display()))
    }
}
