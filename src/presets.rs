use std::str::FromStr;

use rand::RngCore;

use crate::assets::charset::Charset;
use crate::assets::palette::{random_contrast_pair, random_deep, random_light};
use crate::effects::noise::NoiseDensity;
use crate::foundation::core::Rgba8;
use crate::foundation::error::CaptchaError;
use crate::pipeline::{BlurKind, ColorSpec, LineKind, NoiseKind, StageSpec};

/// How hard the produced image is to read automatically.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Curated colors, upright text, one line.
    VeryEasy,
    /// Light noise and a gentle twist.
    #[default]
    Easy,
    /// More noise, a curve and a stronger twist.
    Medium,
    /// Glyph clutter, three lines and the full twist.
    Hard,
}

/// How the background and foreground colors are picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStrategy {
    /// One of the curated high-contrast pairs.
    CuratedPair,
    /// Independent random light background and deep foreground.
    RandomLightDeep,
}

impl BackgroundStrategy {
    /// `(background, foreground)`.
    pub fn pick(self, rng: &mut dyn RngCore) -> (Rgba8, Rgba8) {
        match self {
            Self::CuratedPair => random_contrast_pair(rng),
            Self::RandomLightDeep => {
                let bg = random_light(rng);
                (bg, random_deep(rng))
            }
        }
    }
}

/// Colors plus the ordered stages for one difficulty.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recipe {
    /// Color selection.
    pub background: BackgroundStrategy,
    /// Stages in application order; the border is always first.
    pub stages: Vec<StageSpec>,
}

impl Recipe {
    /// Number of interference-line stages.
    pub fn line_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| matches!(s, StageSpec::Line { .. }))
            .count()
    }

    /// Sum of the noise fractions of every noise stage.
    pub fn noise_fraction(&self) -> f64 {
        self.stages
            .iter()
            .filter_map(|s| match s {
                StageSpec::Noise { density, .. } => Some(density.fraction()),
                _ => None,
            })
            .sum()
    }
}

fn border() -> StageSpec {
    StageSpec::Border {
        color: ColorSpec::Deep,
    }
}

fn line(kind: LineKind, color: ColorSpec) -> StageSpec {
    StageSpec::Line { kind, color }
}

fn point_noise(density: NoiseDensity) -> StageSpec {
    StageSpec::Noise {
        kind: NoiseKind::Point,
        density,
    }
}

fn gaussian(kernel_size: u32, sigma: f32) -> StageSpec {
    StageSpec::Blur {
        kind: BlurKind::Gaussian,
        kernel_size,
        sigma,
    }
}

impl Difficulty {
    /// Every level, easiest first.
    pub const ALL: [Self; 4] = [Self::VeryEasy, Self::Easy, Self::Medium, Self::Hard];

    /// Fixed stage table for this level.
    pub fn recipe(self) -> Recipe {
        match self {
            Self::VeryEasy => Recipe {
                background: BackgroundStrategy::CuratedPair,
                stages: vec![
                    StageSpec::Border {
                        color: ColorSpec::Foreground,
                    },
                    StageSpec::twist(0.0, 0.05),
                    line(LineKind::Straight, ColorSpec::Foreground),
                ],
            },
            Self::Easy => Recipe {
                background: BackgroundStrategy::RandomLightDeep,
                stages: vec![
                    border(),
                    point_noise(NoiseDensity::Lower),
                    StageSpec::twist(10.0, 0.025),
                    line(LineKind::Straight, ColorSpec::Deep),
                    gaussian(1, 0.3),
                ],
            },
            Self::Medium => Recipe {
                background: BackgroundStrategy::RandomLightDeep,
                stages: vec![
                    border(),
                    point_noise(NoiseDensity::Medium),
                    line(LineKind::Curve, ColorSpec::Deep),
                    StageSpec::twist(15.0, 0.04),
                    line(LineKind::Straight, ColorSpec::Deep),
                    gaussian(2, 0.5),
                ],
            },
            Self::Hard => Recipe {
                background: BackgroundStrategy::RandomLightDeep,
                stages: vec![
                    border(),
                    StageSpec::text_noise(NoiseDensity::High),
                    point_noise(NoiseDensity::Lower),
                    line(LineKind::Curve, ColorSpec::Deep),
                    StageSpec::twist(20.0, 0.05),
                    line(LineKind::Straight, ColorSpec::Deep),
                    line(LineKind::Hollow, ColorSpec::Light),
                    gaussian(2, 0.65),
                ],
            },
        }
    }

    /// Alphabet answers are drawn from when none is configured.
    pub fn default_charset(self) -> Charset {
        match self {
            Self::VeryEasy | Self::Easy => Charset::Full,
            Self::Medium | Self::Hard => Charset::Clean,
        }
    }
}

impl FromStr for Difficulty {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "very_easy" | "veryeasy" => Ok(Self::VeryEasy),
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(CaptchaError::validation(format!("unknown difficulty '{s}'"))),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/presets.rs"]
mod tests;
