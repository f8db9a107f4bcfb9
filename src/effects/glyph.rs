use ab_glyph::{Font, PxScale, ScaleFont, point};

use crate::assets::fonts::FontHandle;
use crate::foundation::core::{Canvas, Rgba8};

/// One character positioned on a canvas.
#[derive(Clone, Debug)]
pub(crate) struct GlyphPlacement {
    pub(crate) ch: char,
    pub(crate) font: FontHandle,
    /// Line height in pixels (ascent - descent).
    pub(crate) size_px: f32,
    /// Left edge of the glyph's advance box.
    pub(crate) x: f32,
    pub(crate) baseline: f32,
    pub(crate) color: Rgba8,
}

/// Vertical metrics of a font at a given size. `descent` is negative.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlyphMetrics {
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) advance: f32,
}

pub(crate) fn metrics(font: &FontHandle, ch: char, size_px: f32) -> GlyphMetrics {
    let scaled = font.font().as_scaled(PxScale::from(size_px));
    GlyphMetrics {
        ascent: scaled.ascent(),
        descent: scaled.descent(),
        advance: scaled.h_advance(scaled.glyph_id(ch)),
    }
}

/// Rasterize one glyph, calling `plot(x, y, coverage)` for every covered pixel.
///
/// Glyphs without an outline (spaces, missing characters) plot nothing.
pub(crate) fn rasterize(p: &GlyphPlacement, mut plot: impl FnMut(i64, i64, f32)) {
    let font = p.font.font();
    let glyph = font
        .glyph_id(p.ch)
        .with_scale_and_position(PxScale::from(p.size_px), point(p.x, p.baseline));
    let Some(outlined) = font.outline_glyph(glyph) else {
        return;
    };
    let bounds = outlined.px_bounds();
    let (ox, oy) = (bounds.min.x as i64, bounds.min.y as i64);
    outlined.draw(|gx, gy, c| plot(ox + i64::from(gx), oy + i64::from(gy), c));
}

/// Source-over every placement onto `canvas` in order.
pub(crate) fn draw_glyphs(canvas: &mut Canvas, placements: &[GlyphPlacement]) {
    draw_glyphs_sheared(canvas, placements, |_| 0);
}

/// Like [`draw_glyphs`], with every covered pixel of row `y` moved `shift(y)` columns.
///
/// Zero-coverage pixels are never written and shifted pixels leaving the canvas are clipped.
pub(crate) fn draw_glyphs_sheared(
    canvas: &mut Canvas,
    placements: &[GlyphPlacement],
    shift: impl Fn(i64) -> i64,
) {
    for p in placements {
        rasterize(p, |x, y, c| {
            canvas.blend_coverage(x.saturating_add(shift(y)), y, p.color, c);
        });
    }
}
