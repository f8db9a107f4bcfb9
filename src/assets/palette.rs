use rand::{Rng, RngCore};

use crate::foundation::core::Rgba8;

/// Channel range for background-suitable colors.
const LIGHT_MIN: u8 = 200;
/// Channel range for foreground-suitable colors.
const DEEP_MAX: u8 = 80;

/// Minimum WCAG contrast ratio every light/deep pair satisfies.
pub const MIN_CONTRAST: f64 = 4.5;

/// Curated `(background, foreground)` pairs for the easiest difficulty.
pub const HIGH_CONTRAST_PAIRS: &[(Rgba8, Rgba8)] = &[
    (Rgba8::opaque(255, 255, 255), Rgba8::opaque(0, 0, 0)),
    (Rgba8::opaque(250, 248, 239), Rgba8::opaque(20, 33, 61)),
    (Rgba8::opaque(236, 245, 255), Rgba8::opaque(13, 27, 42)),
    (Rgba8::opaque(255, 250, 230), Rgba8::opaque(60, 20, 20)),
    (Rgba8::opaque(240, 255, 240), Rgba8::opaque(0, 60, 30)),
    (Rgba8::opaque(248, 240, 255), Rgba8::opaque(45, 10, 70)),
];

/// Random opaque high-luminance color.
pub fn random_light(rng: &mut dyn RngCore) -> Rgba8 {
    Rgba8::opaque(
        rng.random_range(LIGHT_MIN..=255),
        rng.random_range(LIGHT_MIN..=255),
        rng.random_range(LIGHT_MIN..=255),
    )
}

/// Random opaque low-luminance color.
pub fn random_deep(rng: &mut dyn RngCore) -> Rgba8 {
    Rgba8::opaque(
        rng.random_range(0..=DEEP_MAX),
        rng.random_range(0..=DEEP_MAX),
        rng.random_range(0..=DEEP_MAX),
    )
}

/// Random translucent mid-tone color for background clutter.
pub fn random_faint(rng: &mut dyn RngCore) -> Rgba8 {
    Rgba8::new(
        rng.random_range(60..=200),
        rng.random_range(60..=200),
        rng.random_range(60..=200),
        rng.random_range(64..=144),
    )
}

/// Pick one curated high-contrast pair.
pub fn random_contrast_pair(rng: &mut dyn RngCore) -> (Rgba8, Rgba8) {
    HIGH_CONTRAST_PAIRS[rng.random_range(0..HIGH_CONTRAST_PAIRS.len())]
}

/// WCAG relative luminance of the color's RGB channels.
pub fn relative_luminance(c: Rgba8) -> f64 {
    fn lin(v: u8) -> f64 {
        let s = f64::from(v) / 255.0;
        if s <= 0.039_28 {
            s / 12.92
        } else {
            ((s + 0.055) / 1.055).powf(2.4)
        }
    }
    0.2126 * lin(c.r) + 0.7152 * lin(c.g) + 0.0722 * lin(c.b)
}

/// WCAG contrast ratio in `[1, 21]`.
pub fn contrast_ratio(a: Rgba8, b: Rgba8) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/palette.rs"]
mod tests;
