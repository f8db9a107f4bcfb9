//! Text drawers: the answer string rendered glyph by glyph.
//!
//! [`PlainText`] paints straight onto the canvas. [`TwistText`] shears every glyph row by
//! `amplitude * sin(frequency * y)` pixels while rasterizing, blending only covered pixels,
//! so background, border and noise survive and an unsheared twist equals plain drawing.

use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::assets::fonts::FontProvider;
use crate::assets::palette::random_deep;
use crate::effects::glyph::{GlyphPlacement, draw_glyphs, draw_glyphs_sheared, metrics};
use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptchaError, CaptchaResult};

/// Default resolution; font sizes are in points and `pt * dpi / 72` gives pixels.
pub const DEFAULT_DPI: f32 = 72.0;
/// Default twist amplitude in pixels.
pub const DEFAULT_AMPLITUDE: f32 = 20.0;
/// Default twist frequency in radians per row.
pub const DEFAULT_FREQUENCY: f32 = 0.05;

/// Horizontal margin kept free on each side by the twisted layout.
const TEXT_MARGIN_PX: u32 = 10;
/// Vertical padding kept free above and below twisted glyphs.
const TEXT_PAD_PX: f32 = 2.0;
/// Smallest canvas height text is laid out on.
pub const MIN_TEXT_HEIGHT: u32 = 8;

const MIN_SIZE_OF_HEIGHT: f32 = 0.65;
const MAX_SIZE_OF_HEIGHT: f32 = 0.8;
const MIN_SIZE_OF_SLOT: f32 = 0.9;

/// Renders a string onto a canvas.
pub trait TextDrawer {
    /// Draw `text`. Errors on empty text or an empty canvas before touching any pixel.
    fn draw_text(&self, canvas: &mut Canvas, text: &str, rng: &mut dyn RngCore)
    -> CaptchaResult<()>;
}

fn check_inputs(canvas: &Canvas, text: &str) -> CaptchaResult<usize> {
    if text.is_empty() {
        return Err(CaptchaError::EmptyText);
    }
    canvas.ensure_drawable()?;
    let chars = text.chars().count();
    if canvas.height() < MIN_TEXT_HEIGHT || canvas.width() < chars as u32 {
        return Err(CaptchaError::CanvasTooSmall {
            width: canvas.width(),
            height: canvas.height(),
            chars,
        });
    }
    Ok(chars)
}

fn to_px(size_pt: f32, dpi: f32) -> f32 {
    let dpi = if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        DEFAULT_DPI
    };
    size_pt * dpi / 72.0
}

/// Glyphs placed loosely: random size up to the full height, random spot in each slot.
#[derive(Clone)]
pub struct PlainText {
    fonts: Arc<dyn FontProvider>,
    dpi: f32,
}

impl PlainText {
    /// Plain drawer at [`DEFAULT_DPI`].
    pub fn new(fonts: Arc<dyn FontProvider>) -> Self {
        Self::with_dpi(fonts, DEFAULT_DPI)
    }

    /// Plain drawer at a custom DPI.
    pub fn with_dpi(fonts: Arc<dyn FontProvider>, dpi: f32) -> Self {
        Self { fonts, dpi }
    }

    fn layout(
        &self,
        canvas: &Canvas,
        text: &str,
        chars: usize,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<Vec<GlyphPlacement>> {
        let width = canvas.width() as f32;
        let height = canvas.height() as f32;
        let slot = (canvas.width() / chars as u32) as f32;

        let mut out = Vec::with_capacity(chars);
        for (i, ch) in text.chars().enumerate() {
            let shrink = 1.0 + rng.random_range(0..7) as f32 / 9.0;
            let size_px = to_px(height / shrink, self.dpi).min(height);
            let font = self.fonts.random_font(rng)?;
            let m = metrics(&font, ch, size_px);

            let free = (slot - m.advance).max(0.0);
            let x = slot * i as f32 + rng.random_range(0.0..=free);

            // Baseline somewhere in the lower half, glyph kept inside the canvas.
            let lo = m.ascent.max(height / 2.0);
            let hi = (height + m.descent).max(lo);
            let baseline = rng.random_range(lo..=hi);

            out.push(GlyphPlacement {
                ch,
                font,
                size_px,
                x: x.min(width - 1.0),
                baseline,
                color: random_deep(rng),
            });
        }
        Ok(out)
    }
}

impl TextDrawer for PlainText {
    fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        let chars = check_inputs(canvas, text)?;
        let placements = self.layout(canvas, text, chars, rng)?;
        draw_glyphs(canvas, &placements);
        Ok(())
    }
}

/// Glyphs sized within a legibility band, then sheared along a sine wave.
///
/// `amplitude == 0` or `frequency == 0` yields an undistorted copy.
#[derive(Clone)]
pub struct TwistText {
    fonts: Arc<dyn FontProvider>,
    dpi: f32,
    amplitude: f32,
    frequency: f32,
}

impl TwistText {
    /// Twisted drawer at [`DEFAULT_DPI`].
    pub fn new(fonts: Arc<dyn FontProvider>, amplitude: f32, frequency: f32) -> Self {
        Self::with_dpi(fonts, DEFAULT_DPI, amplitude, frequency)
    }

    /// Twisted drawer at a custom DPI.
    pub fn with_dpi(
        fonts: Arc<dyn FontProvider>,
        dpi: f32,
        amplitude: f32,
        frequency: f32,
    ) -> Self {
        Self {
            fonts,
            dpi,
            amplitude,
            frequency,
        }
    }

    /// Shear amplitude in pixels.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Shear frequency in radians per row.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub(crate) fn layout(
        &self,
        canvas: &Canvas,
        text: &str,
        chars: usize,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<Vec<GlyphPlacement>> {
        let width = canvas.width();
        let height = canvas.height() as f32;
        let margin = TEXT_MARGIN_PX.min(width / 10);
        let slot_px = (width - 2 * margin) / chars as u32;
        if slot_px == 0 {
            return Err(CaptchaError::CanvasTooSmall {
                width,
                height: canvas.height(),
                chars,
            });
        }
        let slot = slot_px as f32;

        let max_size = height * MAX_SIZE_OF_HEIGHT;
        let min_size = (height * MIN_SIZE_OF_HEIGHT).max(slot * MIN_SIZE_OF_SLOT);

        let mut out = Vec::with_capacity(chars);
        for (i, ch) in text.chars().enumerate() {
            let grow = 1.0 + rng.random_range(0..15) as f32 / 100.0;
            let size_px = to_px(min_size * grow, self.dpi).min(max_size);
            let font = self.fonts.random_font(rng)?;
            let m = metrics(&font, ch, size_px);

            let x = margin as f32 + slot * i as f32 + (slot - m.advance) / 2.0;

            // Centered baseline, jittered only as far as the glyph box stays on canvas.
            let glyph_h = m.ascent - m.descent;
            let center = (height + m.ascent + m.descent) / 2.0;
            let max_offset = ((height - glyph_h) / 2.0 - TEXT_PAD_PX).max(0.0).floor() as i32;
            let offset = rng.random_range(-max_offset..=max_offset);

            out.push(GlyphPlacement {
                ch,
                font,
                size_px,
                x,
                baseline: center + offset as f32,
                color: random_deep(rng),
            });
        }
        Ok(out)
    }
}

impl TextDrawer for TwistText {
    fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        let chars = check_inputs(canvas, text)?;
        let placements = self.layout(canvas, text, chars, rng)?;
        draw_glyphs_sheared(canvas, &placements, |y| {
            twist_offset(self.amplitude, self.frequency, y)
        });
        Ok(())
    }
}

/// Row shift of the twist at row `y`, truncated toward zero.
pub(crate) fn twist_offset(amplitude: f32, frequency: f32, y: i64) -> i64 {
    (f64::from(amplitude) * (f64::from(frequency) * y as f64).sin()) as i64
}

#[cfg(test)]
#[path = "../../tests/unit/effects/text.rs"]
mod tests;
