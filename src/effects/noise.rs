//! Noise drawers: background clutter bounded by a per-canvas pixel budget.

use std::f64::consts::FRAC_PI_3;
use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::assets::charset::Charset;
use crate::assets::fonts::FontProvider;
use crate::assets::palette::random_faint;
use crate::effects::glyph::{GlyphPlacement, rasterize};
use crate::effects::text::DEFAULT_DPI;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::CaptchaResult;

/// How much of the canvas a noise stage may touch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NoiseDensity {
    /// 3% of the pixels.
    #[default]
    Lower,
    /// 6% of the pixels.
    Medium,
    /// 12% of the pixels.
    High,
}

impl NoiseDensity {
    /// Fraction of canvas pixels a stage may write.
    pub fn fraction(self) -> f64 {
        match self {
            Self::Lower => 0.03,
            Self::Medium => 0.06,
            Self::High => 0.12,
        }
    }

    /// Pixel-write budget on a `width` x `height` canvas.
    pub fn budget(self, width: u32, height: u32) -> usize {
        let area = f64::from(width) * f64::from(height);
        (area * self.fraction()).floor() as usize
    }
}

/// Scatters clutter over a canvas.
///
/// Implementations count every pixel they write and stop at [`NoiseDensity::budget`].
pub trait NoiseDrawer {
    /// Draw noise at `density`.
    fn draw_noise(
        &self,
        canvas: &mut Canvas,
        density: NoiseDensity,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()>;
}

/// Random-colored 1px and 2x2 dots.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointNoise;

impl NoiseDrawer for PointNoise {
    fn draw_noise(
        &self,
        canvas: &mut Canvas,
        density: NoiseDensity,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        canvas.ensure_drawable()?;
        let (w, h) = (canvas.width(), canvas.height());
        let mut left = density.budget(w, h);

        while left > 0 {
            let color = Rgba8::opaque(rng.random(), rng.random(), rng.random());
            let dot = if left >= 4 && w >= 2 && h >= 2 && rng.random_bool(0.5) {
                2
            } else {
                1
            };
            let x = i64::from(rng.random_range(0..=w - dot));
            let y = i64::from(rng.random_range(0..=h - dot));
            for oy in 0..i64::from(dot) {
                for ox in 0..i64::from(dot) {
                    if canvas.set(x + ox, y + oy, color) {
                        left -= 1;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Faint, rotated, randomly sized characters.
#[derive(Clone)]
pub struct TextNoise {
    fonts: Arc<dyn FontProvider>,
    dpi: f32,
    base_font_size: f32,
}

impl TextNoise {
    /// Default glyph size in points before randomization.
    pub const DEFAULT_FONT_SIZE: f32 = 14.0;

    /// Glyph noise at `dpi` with [`Self::DEFAULT_FONT_SIZE`].
    pub fn new(fonts: Arc<dyn FontProvider>, dpi: f32) -> Self {
        Self::with_font_size(fonts, dpi, Self::DEFAULT_FONT_SIZE)
    }

    /// Glyph noise with a custom base size in points.
    pub fn with_font_size(fonts: Arc<dyn FontProvider>, dpi: f32, base_font_size: f32) -> Self {
        let dpi = if dpi.is_finite() && dpi > 0.0 {
            dpi
        } else {
            DEFAULT_DPI
        };
        Self {
            fonts,
            dpi,
            base_font_size: base_font_size.max(1.0),
        }
    }
}

/// Antialiasing coverage of one glyph on its own pixel grid.
struct Coverage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Coverage {
    fn of(p: &GlyphPlacement) -> Option<Self> {
        let mut hits = Vec::new();
        rasterize(p, |x, y, c| hits.push((x, y, c)));
        let min_x = hits.iter().map(|h| h.0).min()?;
        let min_y = hits.iter().map(|h| h.1).min()?;
        let max_x = hits.iter().map(|h| h.0).max()?;
        let max_y = hits.iter().map(|h| h.1).max()?;
        let width = (max_x - min_x + 1) as usize;
        let height = (max_y - min_y + 1) as usize;
        let mut data = vec![0.0; width * height];
        for (x, y, c) in hits {
            data[(y - min_y) as usize * width + (x - min_x) as usize] = c;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    fn sample(&self, x: f64, y: f64) -> f32 {
        let (xi, yi) = (x.floor(), y.floor());
        if xi < 0.0 || yi < 0.0 || xi >= self.width as f64 || yi >= self.height as f64 {
            return 0.0;
        }
        self.data[yi as usize * self.width + xi as usize]
    }
}

impl NoiseDrawer for TextNoise {
    fn draw_noise(
        &self,
        canvas: &mut Canvas,
        density: NoiseDensity,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        canvas.ensure_drawable()?;
        let (w, h) = (canvas.width(), canvas.height());
        let mut left = density.budget(w, h);
        let base_px = self.base_font_size * self.dpi / 72.0;
        let chars = Charset::Full.chars().as_bytes();

        // Bounded even when no glyph ever lands on the canvas.
        let mut attempts = left;
        while left > 0 && attempts > 0 {
            attempts -= 1;
            let ch = char::from(chars[rng.random_range(0..chars.len())]);
            let placement = GlyphPlacement {
                ch,
                font: self.fonts.random_font(rng)?,
                size_px: base_px * rng.random_range(0.5..1.5),
                x: 0.0,
                baseline: 0.0,
                color: random_faint(rng),
            };
            let Some(cov) = Coverage::of(&placement) else {
                continue;
            };

            let angle = rng.random_range(-FRAC_PI_3..FRAC_PI_3);
            let (sin, cos) = angle.sin_cos();
            let (cx, cy) = (
                i64::from(rng.random_range(0..w)),
                i64::from(rng.random_range(0..h)),
            );
            let (hw, hh) = (cov.width as f64 / 2.0, cov.height as f64 / 2.0);
            let reach = hw.hypot(hh).ceil() as i64;

            'glyph: for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let (fx, fy) = (dx as f64 + 0.5, dy as f64 + 0.5);
                    // Inverse rotation back onto the upright coverage grid.
                    let sx = fx * cos + fy * sin + hw;
                    let sy = -fx * sin + fy * cos + hh;
                    let c = cov.sample(sx, sy);
                    if c <= 0.0 {
                        continue;
                    }
                    let (px, py) = (cx + dx, cy + dy);
                    if canvas.blend_coverage(px, py, placement.color, c) {
                        left -= 1;
                        if left == 0 {
                            break 'glyph;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
