use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::charset::{Charset, random_text};
use crate::assets::fonts::{FontFamily, FontProvider, default_fonts};
use crate::config::GeneratorConfig;
use crate::encode::ImageFormat;
use crate::config::MAX_TEXT_LEN;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{CaptchaError, CaptchaResult};
use crate::pipeline::{Captcha, StageContext};
use crate::presets::Difficulty;

/// A finished captcha: the answer and its encoded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    /// Answer the image shows.
    pub text: String,
    /// Encoded bytes.
    pub image: Vec<u8>,
    /// Encoding of `image`.
    pub format: ImageFormat,
}

impl Generated {
    /// MIME type of `image`.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Produces captchas from difficulty presets.
///
/// Holds no per-request state and can be shared across threads.
#[derive(Clone)]
pub struct Generator {
    fonts: Arc<dyn FontProvider>,
    format: ImageFormat,
    seed: Option<u64>,
    charset: Option<Charset>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("format", &self.format)
            .field("seed", &self.seed)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// JPEG output, OS-seeded, difficulty-default charset.
    pub fn new(fonts: Arc<dyn FontProvider>) -> Self {
        Self {
            fonts,
            format: ImageFormat::Jpeg,
            seed: None,
            charset: None,
        }
    }

    /// Build from a validated config, loading its font directories.
    pub fn from_config(cfg: &GeneratorConfig) -> CaptchaResult<Self> {
        cfg.validate()?;
        let fonts: Arc<dyn FontProvider> = if cfg.font_dirs.is_empty() {
            default_fonts()
        } else {
            let family = FontFamily::with_embedded();
            for dir in &cfg.font_dirs {
                family.add_font_dir(dir)?;
            }
            Arc::new(family)
        };
        let mut generator = Self::new(fonts).with_format(cfg.format);
        generator.seed = cfg.seed;
        generator.charset = cfg.charset;
        Ok(generator)
    }

    /// Output encoding.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Fixed seed: every call then yields the same answer and bytes for the same arguments.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Answer alphabet, overriding the difficulty's default.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Random answer of `len` characters drawn at `difficulty`.
    #[tracing::instrument(skip(self), fields(format = %self.format))]
    pub fn generate(
        &self,
        width: u32,
        height: u32,
        len: usize,
        difficulty: Difficulty,
    ) -> CaptchaResult<Generated> {
        if len > MAX_TEXT_LEN {
            return Err(CaptchaError::validation(format!(
                "length {len} exceeds {MAX_TEXT_LEN}"
            )));
        }
        let mut canvas = Canvas::new(width, height, Rgba8::TRANSPARENT)?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let charset = self
            .charset
            .unwrap_or_else(|| difficulty.default_charset());
        let text = random_text(&mut rng, len, charset);

        let recipe = difficulty.recipe();
        let (background, foreground) = recipe.background.pick(&mut rng);
        canvas.fill(background);
        let ctx = StageContext {
            fonts: self.fonts.clone(),
            text: &text,
            foreground,
        };
        let captcha = Captcha::from_parts(canvas, rng)
            .apply_all(&recipe.stages, &ctx)?;
        let image = captcha.encode(self.format)?;
        tracing::debug!(bytes = image.len(), "captcha encoded");

        Ok(Generated {
            text,
            image,
            format: self.format,
        })
    }
}

/// One JPEG captcha with the embedded fonts: `(answer, bytes)`.
pub fn generate(
    width: u32,
    height: u32,
    len: usize,
    difficulty: Difficulty,
) -> CaptchaResult<(String, Vec<u8>)> {
    let out = Generator::new(default_fonts()).generate(width, height, len, difficulty)?;
    Ok((out.text, out.image))
}

#[cfg(test)]
#[path = "../tests/unit/generate.rs"]
mod tests;
