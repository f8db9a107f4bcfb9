use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptchaError, CaptchaResult};

/// Largest accepted kernel radius.
pub const MAX_BLUR_RADIUS: u32 = 32;

/// Softens the whole canvas.
///
/// `kernel_size` is the kernel radius: `2 * kernel_size + 1` taps per axis. Zero is a no-op.
pub trait BlurDrawer {
    /// Blur `canvas` in place.
    fn draw_blur(&self, canvas: &mut Canvas, kernel_size: u32, sigma: f32) -> CaptchaResult<()>;
}

/// Separable Gaussian blur with a Q16 fixed-point kernel and clamp-to-edge sampling.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianBlur;

impl BlurDrawer for GaussianBlur {
    fn draw_blur(&self, canvas: &mut Canvas, kernel_size: u32, sigma: f32) -> CaptchaResult<()> {
        let kernel = gaussian_kernel_q16(kernel_size, sigma)?;
        blur_separable(canvas, &kernel)
    }
}

/// Separable box blur; every tap weighs the same and `sigma` is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxBlur;

impl BlurDrawer for BoxBlur {
    fn draw_blur(&self, canvas: &mut Canvas, kernel_size: u32, _sigma: f32) -> CaptchaResult<()> {
        let kernel = box_kernel_q16(kernel_size)?;
        blur_separable(canvas, &kernel)
    }
}

fn check_radius(radius: u32) -> CaptchaResult<()> {
    if radius > MAX_BLUR_RADIUS {
        return Err(CaptchaError::validation(format!(
            "blur kernel size must be <= {MAX_BLUR_RADIUS}, got {radius}"
        )));
    }
    Ok(())
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CaptchaResult<Vec<u32>> {
    check_radius(radius)?;
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CaptchaError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    normalize_q16(&weights)
}

pub(crate) fn box_kernel_q16(radius: u32) -> CaptchaResult<Vec<u32>> {
    check_radius(radius)?;
    normalize_q16(&vec![1.0; (2 * radius + 1) as usize])
}

/// Scale weights to sum to exactly `1 << 16`, folding rounding drift into the center tap.
fn normalize_q16(weights: &[f64]) -> CaptchaResult<Vec<u32>> {
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return Err(CaptchaError::validation("blur kernel sum is zero"));
    }

    let mut out = Vec::with_capacity(weights.len());
    let mut acc: i64 = 0;
    for &wf in weights {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        out.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = out.len() / 2;
        out[mid] = (i64::from(out[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(out)
}

fn blur_separable(canvas: &mut Canvas, kernel: &[u32]) -> CaptchaResult<()> {
    canvas.ensure_drawable()?;
    if kernel.len() <= 1 {
        return Ok(());
    }
    let (w, h) = (canvas.width() as usize, canvas.height() as usize);
    // Opaque canvases keep their alpha untouched; only color is smoothed.
    let channels = if canvas.data().chunks_exact(4).all(|px| px[3] == 255) {
        3
    } else {
        4
    };
    let mut tmp = vec![0u8; canvas.data().len()];
    convolve_axis(canvas.data(), &mut tmp, w, h, Axis::Rows, kernel, channels);
    convolve_axis(&tmp, canvas.data_mut(), w, h, Axis::Columns, kernel, channels);
    Ok(())
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

/// One 1-D convolution pass along `axis`, clamping samples to the line ends.
///
/// Channels at or past `channels` are copied from `src` unchanged.
fn convolve_axis(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    axis: Axis,
    k: &[u32],
    channels: usize,
) {
    let (lines, len, line_step, px_step) = match axis {
        Axis::Rows => (height, width, width * 4, 4),
        Axis::Columns => (width, height, 4, width * 4),
    };
    let radius = k.len() / 2;
    for line in 0..lines {
        let base = line * line_step;
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let s = (i + ki).saturating_sub(radius).min(len - 1);
                let idx = base + s * px_step;
                for (c, a) in acc.iter_mut().enumerate().take(channels) {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = base + i * px_step;
            for c in 0..4 {
                dst[out + c] = if c < channels {
                    q16_to_u8(acc[c])
                } else {
                    src[out + c]
                };
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
