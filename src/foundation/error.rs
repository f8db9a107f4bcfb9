/// Crate-wide result alias.
pub type CaptchaResult<T> = Result<T, CaptchaError>;

/// Errors raised while composing or encoding a captcha.
///
/// No variant is retried internally: a failing stage ends the whole generation request.
#[derive(thiserror::Error, Debug)]
pub enum CaptchaError {
    /// Invalid configuration value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested output format is not one of the supported encoders.
    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),

    /// Text drawer was given nothing to draw.
    #[error("text is empty")]
    EmptyText,

    /// Canvas has no drawable pixels.
    #[error("canvas is empty ({width}x{height})")]
    EmptyCanvas {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },

    /// Canvas exists but cannot fit the requested text.
    #[error("canvas {width}x{height} is too small for {chars} characters")]
    CanvasTooSmall {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
        /// Number of characters requested.
        chars: usize,
    },

    /// Font provider holds no fonts.
    #[error("font family has no fonts")]
    NoFonts,

    /// Font could not be read, parsed or looked up.
    #[error("font error: {0}")]
    Font(String),

    /// Image encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptchaError {
    /// Build a [`CaptchaError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptchaError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`CaptchaError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

impl From<image::ImageError> for CaptchaError {
    fn from(err: image::ImageError) -> Self {
        Self::Encode(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
