//! Distorted-text captcha images.
//!
//! A [`Captcha`] owns a canvas and runs drawing stages over it: border, noise, interference
//! lines, twisted text and blur. [`Difficulty`] presets bundle those stages into fixed
//! recipes and [`Generator`] turns a preset into an answer plus encoded image bytes.
//!
//! ```
//! let (answer, jpeg) = glyphwarp::generate(180, 60, 4, glyphwarp::Difficulty::Easy).unwrap();
//! assert_eq!(answer.chars().count(), 4);
//! assert!(jpeg.starts_with(&[0xFF, 0xD8]));
//! ```

#![forbid(unsafe_code)]

mod assets;
mod config;
mod effects;
mod encode;
mod foundation;
mod generate;
mod pipeline;
mod presets;

pub use assets::charset::{Charset, random_text};
pub use assets::fonts::{FontFamily, FontHandle, FontProvider, default_fonts, embedded_fonts};
pub use assets::palette;
pub use config::{GeneratorConfig, MAX_SIDE_PX, MAX_TEXT_LEN};
pub use effects::blur::{BlurDrawer, BoxBlur, GaussianBlur, MAX_BLUR_RADIUS};
pub use effects::line::{Beeline, BezierCurve, HollowLine, LineDrawer};
pub use effects::noise::{NoiseDensity, NoiseDrawer, PointNoise, TextNoise};
pub use effects::text::{
    DEFAULT_AMPLITUDE, DEFAULT_DPI, DEFAULT_FREQUENCY, MIN_TEXT_HEIGHT, PlainText, TextDrawer,
    TwistText,
};
pub use encode::{ImageFormat, JPEG_QUALITY, encode_canvas, write_canvas};
pub use foundation::core::{Canvas, Point, Rgba8};
pub use foundation::error::{CaptchaError, CaptchaResult};
pub use generate::{Generated, Generator, generate};
pub use pipeline::{
    BlurKind, Captcha, ColorSpec, LineKind, NoiseKind, StageContext, StageSpec, TextKind,
};
pub use presets::{BackgroundStrategy, Difficulty, Recipe};
