use std::io::Write;
use std::str::FromStr;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, Frame, ImageEncoder};

use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptchaError, CaptchaResult};

/// JPEG quality used for every JPEG output.
pub const JPEG_QUALITY: u8 = 100;

/// Output byte format.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless RGBA8.
    Png,
    /// RGB8, alpha dropped.
    #[default]
    Jpeg,
    /// Palette-quantized, at most 256 colors.
    Gif,
}

impl ImageFormat {
    /// Every supported format.
    pub const ALL: [Self; 3] = [Self::Png, Self::Jpeg, Self::Gif];

    /// MIME type for HTTP responses.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    /// Format for a file extension such as `"png"` or `".JPG"`.
    pub fn from_extension(ext: &str) -> CaptchaResult<Self> {
        ext.trim_start_matches('.').parse()
    }
}

impl FromStr for ImageFormat {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            _ => Err(CaptchaError::UnsupportedFormat(s.to_owned())),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        })
    }
}

/// Serialize `canvas` into a fresh buffer.
pub fn encode_canvas(canvas: &Canvas, format: ImageFormat) -> CaptchaResult<Vec<u8>> {
    let mut out = Vec::new();
    write_canvas(canvas, &mut out, format)?;
    Ok(out)
}

/// Serialize `canvas` into `out`.
///
/// A zero-sized canvas is an [`CaptchaError::EmptyCanvas`] error; nothing is written then.
pub fn write_canvas<W: Write>(canvas: &Canvas, out: &mut W, format: ImageFormat) -> CaptchaResult<()> {
    canvas.ensure_drawable()?;
    let (w, h) = (canvas.width(), canvas.height());
    match format {
        ImageFormat::Png => {
            PngEncoder::new(out).write_image(canvas.data(), w, h, ExtendedColorType::Rgba8)?;
        }
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas.to_rgba_image()?).to_rgb8();
            JpegEncoder::new_with_quality(out, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(out);
            encoder.encode_frame(Frame::new(canvas.to_rgba_image()?))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/encode.rs"]
mod tests;
