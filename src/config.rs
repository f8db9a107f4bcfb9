use std::path::{Path, PathBuf};

use crate::assets::charset::Charset;
use crate::encode::ImageFormat;
pub use crate::foundation::core::MAX_SIDE_PX;
use crate::foundation::error::{CaptchaError, CaptchaResult};
use crate::presets::Difficulty;

/// Longest answer accepted.
pub const MAX_TEXT_LEN: usize = 64;

/// Everything a [`crate::Generator`] needs, loadable from JSON.
///
/// Missing fields take their defaults:
///
/// ```
/// let cfg = glyphwarp::GeneratorConfig::from_json_str(r#"{ "difficulty": "hard" }"#).unwrap();
/// assert_eq!((cfg.width, cfg.height, cfg.length), (180, 60, 4));
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Answer length in characters.
    pub length: usize,
    /// Preset.
    pub difficulty: Difficulty,
    /// Output encoding.
    pub format: ImageFormat,
    /// Fixed seed; `None` seeds from the OS per request.
    pub seed: Option<u64>,
    /// Answer alphabet; `None` uses the difficulty's default.
    pub charset: Option<Charset>,
    /// Extra font directories loaded next to the embedded fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 180,
            height: 60,
            length: 4,
            difficulty: Difficulty::Easy,
            format: ImageFormat::Jpeg,
            seed: None,
            charset: None,
            font_dirs: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parse from a JSON string and validate.
    pub fn from_json_str(s: &str) -> CaptchaResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| CaptchaError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> CaptchaResult<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&s)
    }

    /// Check sizes and length against the accepted ranges.
    pub fn validate(&self) -> CaptchaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptchaError::validation("width/height must be > 0"));
        }
        if self.width > MAX_SIDE_PX || self.height > MAX_SIDE_PX {
            return Err(CaptchaError::validation(format!(
                "width/height must be <= {MAX_SIDE_PX}"
            )));
        }
        if self.length == 0 || self.length > MAX_TEXT_LEN {
            return Err(CaptchaError::validation(format!(
                "length must be in 1..={MAX_TEXT_LEN}"
            )));
        }
        Ok(())
    }

    /// Charset in effect: the configured one or the difficulty's default.
    pub fn effective_charset(&self) -> Charset {
        self.charset
            .unwrap_or_else(|| self.difficulty.default_charset())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
