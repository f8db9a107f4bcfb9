//! Captcha composition: a canvas plus its random source, threaded through drawing stages.
//!
//! Every stage consumes the [`Captcha`] and hands it back inside a [`CaptchaResult`], so a
//! chain stops at the first failing stage:
//!
//! ```
//! use glyphwarp::{Beeline, Captcha, GaussianBlur, ImageFormat, Rgba8, TwistText, default_fonts};
//!
//! let ink = Rgba8::opaque(20, 20, 60);
//! let bytes = Captcha::with_seed(180, 60, Rgba8::opaque(250, 250, 250), 7)?
//!     .draw_border(ink)
//!     .and_then(|c| c.draw_text(&TwistText::new(default_fonts(), 10.0, 0.03), "k3Xy"))
//!     .and_then(|c| c.draw_line(&Beeline::default(), ink))
//!     .and_then(|c| c.draw_blur(&GaussianBlur, 1, 0.3))
//!     .and_then(|c| c.encode(ImageFormat::Png))?;
//! assert!(bytes.starts_with(b"\x89PNG"));
//! # Ok::<(), glyphwarp::CaptchaError>(())
//! ```

use std::io::Write;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::fonts::FontProvider;
use crate::assets::palette::{random_deep, random_light};
use crate::effects::blur::{BlurDrawer, BoxBlur, GaussianBlur};
use crate::effects::line::{Beeline, BezierCurve, HollowLine, LineDrawer};
use crate::effects::noise::{NoiseDensity, NoiseDrawer, PointNoise, TextNoise};
use crate::effects::text::{DEFAULT_DPI, PlainText, TextDrawer, TwistText};
use crate::encode::{ImageFormat, encode_canvas, write_canvas};
use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::CaptchaResult;

/// A captcha under construction.
#[derive(Clone, Debug)]
pub struct Captcha {
    canvas: Canvas,
    rng: StdRng,
}

impl Captcha {
    /// Canvas of `width` x `height` filled with `background`, seeded from the OS.
    ///
    /// A zero-sized canvas is accepted here and rejected by the first stage or by encoding.
    /// Sides above [`crate::MAX_SIDE_PX`] fail with [`crate::CaptchaError::Validation`].
    pub fn new(width: u32, height: u32, background: Rgba8) -> CaptchaResult<Self> {
        let canvas = Canvas::new(width, height, background)?;
        Ok(Self::from_parts(canvas, StdRng::from_os_rng()))
    }

    /// Like [`Captcha::new`] with a fixed seed; equal seeds and stages give equal pixels.
    pub fn with_seed(
        width: u32,
        height: u32,
        background: Rgba8,
        seed: u64,
    ) -> CaptchaResult<Self> {
        let canvas = Canvas::new(width, height, background)?;
        Ok(Self::from_parts(canvas, StdRng::seed_from_u64(seed)))
    }

    /// Continue from an existing canvas and random source.
    pub fn from_parts(canvas: Canvas, rng: StdRng) -> Self {
        Self { canvas, rng }
    }

    /// Current pixels.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Give up the builder and keep the pixels.
    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// One-pixel outline on all four edges, assigned directly.
    pub fn draw_border(mut self, color: Rgba8) -> CaptchaResult<Self> {
        self.canvas.ensure_drawable()?;
        let w = i64::from(self.canvas.width());
        let h = i64::from(self.canvas.height());
        for x in 0..w {
            self.canvas.set(x, 0, color);
            self.canvas.set(x, h - 1, color);
        }
        for y in 0..h {
            self.canvas.set(0, y, color);
            self.canvas.set(w - 1, y, color);
        }
        tracing::debug!(stage = "border", "stage applied");
        Ok(self)
    }

    /// Interference line from the left edge to the right edge at random heights.
    pub fn draw_line(mut self, drawer: &dyn LineDrawer, color: Rgba8) -> CaptchaResult<Self> {
        self.canvas.ensure_drawable()?;
        let w = f64::from(self.canvas.width());
        let h = self.canvas.height();
        let from = Point::new(1.0, f64::from(self.rng.random_range(0..h)));
        let to = Point::new(w - 2.0, f64::from(self.rng.random_range(0..h)));
        drawer.draw_line(&mut self.canvas, from, to, color, &mut self.rng)?;
        tracing::debug!(stage = "line", "stage applied");
        Ok(self)
    }

    /// Clutter bounded by `density`.
    pub fn draw_noise(
        mut self,
        density: NoiseDensity,
        drawer: &dyn NoiseDrawer,
    ) -> CaptchaResult<Self> {
        drawer.draw_noise(&mut self.canvas, density, &mut self.rng)?;
        tracing::debug!(stage = "noise", ?density, "stage applied");
        Ok(self)
    }

    /// The answer text.
    pub fn draw_text(mut self, drawer: &dyn TextDrawer, text: &str) -> CaptchaResult<Self> {
        drawer.draw_text(&mut self.canvas, text, &mut self.rng)?;
        tracing::debug!(stage = "text", chars = text.chars().count(), "stage applied");
        Ok(self)
    }

    /// Whole-canvas blur with radius `kernel_size`.
    pub fn draw_blur(
        mut self,
        drawer: &dyn BlurDrawer,
        kernel_size: u32,
        sigma: f32,
    ) -> CaptchaResult<Self> {
        drawer.draw_blur(&mut self.canvas, kernel_size, sigma)?;
        tracing::debug!(stage = "blur", kernel_size, sigma, "stage applied");
        Ok(self)
    }

    /// Run one data-described stage.
    pub fn apply(mut self, stage: &StageSpec, ctx: &StageContext<'_>) -> CaptchaResult<Self> {
        match stage {
            StageSpec::Border { color } => {
                let color = color.resolve(ctx.foreground, &mut self.rng);
                self.draw_border(color)
            }
            StageSpec::Line { kind, color } => {
                let color = color.resolve(ctx.foreground, &mut self.rng);
                match kind {
                    LineKind::Straight => self.draw_line(&Beeline::default(), color),
                    LineKind::Curve => self.draw_line(&BezierCurve::default(), color),
                    LineKind::Hollow => self.draw_line(&HollowLine::default(), color),
                }
            }
            StageSpec::Noise { kind, density } => match kind {
                NoiseKind::Point => self.draw_noise(*density, &PointNoise),
                NoiseKind::Text { dpi } => {
                    self.draw_noise(*density, &TextNoise::new(ctx.fonts.clone(), *dpi))
                }
            },
            StageSpec::Text { kind } => match kind {
                TextKind::Plain => self.draw_text(&PlainText::new(ctx.fonts.clone()), ctx.text),
                TextKind::Twist {
                    amplitude,
                    frequency,
                } => self.draw_text(
                    &TwistText::new(ctx.fonts.clone(), *amplitude, *frequency),
                    ctx.text,
                ),
            },
            StageSpec::Blur {
                kind,
                kernel_size,
                sigma,
            } => match kind {
                BlurKind::Gaussian => self.draw_blur(&GaussianBlur, *kernel_size, *sigma),
                BlurKind::Box => self.draw_blur(&BoxBlur, *kernel_size, *sigma),
            },
        }
    }

    /// Run `stages` in order, stopping at the first error.
    pub fn apply_all(self, stages: &[StageSpec], ctx: &StageContext<'_>) -> CaptchaResult<Self> {
        stages.iter().try_fold(self, |captcha, stage| captcha.apply(stage, ctx))
    }

    /// Encode the current pixels.
    pub fn encode(&self, format: ImageFormat) -> CaptchaResult<Vec<u8>> {
        encode_canvas(&self.canvas, format)
    }

    /// Encode the current pixels into `out`.
    pub fn encode_to<W: Write>(&self, out: &mut W, format: ImageFormat) -> CaptchaResult<()> {
        write_canvas(&self.canvas, out, format)
    }
}

/// Inputs a data-described stage needs besides the canvas.
#[derive(Clone)]
pub struct StageContext<'a> {
    /// Fonts for text and glyph noise.
    pub fonts: Arc<dyn FontProvider>,
    /// Answer string for the text stage.
    pub text: &'a str,
    /// Color that [`ColorSpec::Foreground`] resolves to.
    pub foreground: Rgba8,
}

/// Where a stage takes its color from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpec {
    /// The recipe's foreground color.
    Foreground,
    /// A fresh random deep color.
    Deep,
    /// A fresh random light color.
    Light,
    /// A fixed color.
    Fixed(Rgba8),
}

impl ColorSpec {
    fn resolve(self, foreground: Rgba8, rng: &mut StdRng) -> Rgba8 {
        match self {
            Self::Foreground => foreground,
            Self::Deep => random_deep(rng),
            Self::Light => random_light(rng),
            Self::Fixed(c) => c,
        }
    }
}

/// Line drawer selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// [`Beeline`].
    Straight,
    /// [`BezierCurve`].
    Curve,
    /// [`HollowLine`].
    Hollow,
}

/// Noise drawer selection.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// [`PointNoise`].
    Point,
    /// [`TextNoise`] at `dpi`.
    Text {
        /// Resolution for the glyph sizes.
        dpi: f32,
    },
}

/// Text drawer selection.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// [`PlainText`].
    Plain,
    /// [`TwistText`] at the default DPI.
    Twist {
        /// Shear in pixels.
        amplitude: f32,
        /// Radians per row.
        frequency: f32,
    },
}

/// Blur drawer selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    /// [`GaussianBlur`].
    Gaussian,
    /// [`BoxBlur`].
    Box,
}

/// One stage of a recipe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageSpec {
    /// [`Captcha::draw_border`].
    Border {
        /// Outline color.
        color: ColorSpec,
    },
    /// [`Captcha::draw_line`].
    Line {
        /// Drawer.
        kind: LineKind,
        /// Stroke color.
        color: ColorSpec,
    },
    /// [`Captcha::draw_noise`].
    Noise {
        /// Drawer.
        kind: NoiseKind,
        /// Pixel budget.
        density: NoiseDensity,
    },
    /// [`Captcha::draw_text`].
    Text {
        /// Drawer.
        kind: TextKind,
    },
    /// [`Captcha::draw_blur`].
    Blur {
        /// Drawer.
        kind: BlurKind,
        /// Kernel radius.
        kernel_size: u32,
        /// Gaussian sigma.
        sigma: f32,
    },
}

impl StageSpec {
    /// Twisted text at the default DPI.
    pub fn twist(amplitude: f32, frequency: f32) -> Self {
        Self::Text {
            kind: TextKind::Twist {
                amplitude,
                frequency,
            },
        }
    }

    /// Glyph noise at the default DPI.
    pub fn text_noise(density: NoiseDensity) -> Self {
        Self::Noise {
            kind: NoiseKind::Text { dpi: DEFAULT_DPI },
            density,
        }
    }

    /// Short stage name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Border { .. } => "border",
            Self::Line { .. } => "line",
            Self::Noise { .. } => "noise",
            Self::Text { .. } => "text",
            Self::Blur { .. } => "blur",
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
