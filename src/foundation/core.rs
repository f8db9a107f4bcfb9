use crate::foundation::error::{CaptchaError, CaptchaResult};
use crate::foundation::math::{coverage_alpha, over_straight};

pub use kurbo::Point;

/// Largest accepted canvas side in pixels.
pub const MAX_SIDE_PX: u32 = 4096;

fn buffer_len(width: u32, height: u32) -> CaptchaResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CaptchaError::validation("canvas buffer size overflow"))
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel. Zero marks an unpainted pixel on intermediate layers.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Channels as `[r, g, b, a]`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from `[r, g, b, a]`.
    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// Mutable RGBA8 pixel grid, row-major and tightly packed.
///
/// Size is fixed at construction. Writes outside the grid are clipped, never indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Canvas filled uniformly with `fill`.
    ///
    /// Zero-sized canvases are allowed here and rejected by the first stage that needs pixels.
    /// Sides above [`MAX_SIDE_PX`] are a validation error.
    pub fn new(width: u32, height: u32, fill: Rgba8) -> CaptchaResult<Self> {
        if width > MAX_SIDE_PX || height > MAX_SIDE_PX {
            return Err(CaptchaError::validation(format!(
                "canvas {width}x{height} exceeds {MAX_SIDE_PX} px per side"
            )));
        }
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: fill.to_array().repeat(len / 4),
        })
    }

    /// Wrap raw RGBA8 bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> CaptchaResult<Self> {
        if data.len() != buffer_len(width, height)? {
            return Err(CaptchaError::validation(
                "canvas expects data matching width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` when the canvas has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Error unless the canvas has at least one pixel.
    pub fn ensure_drawable(&self) -> CaptchaResult<()> {
        if self.is_empty() {
            return Err(CaptchaError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume into raw RGBA8 bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// `true` when `(x, y)` lies inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Pixel at `(x, y)`, or `None` outside the grid.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgba8> {
        let i = self.index(x, y)?;
        Some(Rgba8::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Assign a pixel. Returns `false` when clipped.
    pub fn set(&mut self, x: i64, y: i64, color: Rgba8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i..i + 4].copy_from_slice(&color.to_array());
                true
            }
            None => false,
        }
    }

    /// Source-over `color` at `(x, y)`. Returns `false` when clipped.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over_straight(dst, color.to_array()));
                true
            }
            None => false,
        }
    }

    /// Source-over `color` scaled by an antialiasing `coverage` in `[0, 1]`.
    ///
    /// Returns `true` when a non-zero alpha landed inside the grid.
    pub fn blend_coverage(&mut self, x: i64, y: i64, color: Rgba8, coverage: f32) -> bool {
        let a = coverage_alpha(coverage, color.a);
        if a == 0 {
            return false;
        }
        self.blend(x, y, color.with_alpha(a))
    }

    /// Fill every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Copy into an [`image::RgbaImage`].
    pub fn to_rgba_image(&self) -> CaptchaResult<image::RgbaImage> {
        self.ensure_drawable()?;
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| CaptchaError::validation("canvas buffer does not match its size"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
