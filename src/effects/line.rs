use kurbo::{CubicBez, ParamCurve, QuadBez};
use rand::{Rng, RngCore};

use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::CaptchaResult;

/// Upper bound on polyline samples for a single curve.
const MAX_CURVE_SAMPLES: usize = 4096;

/// Draws one interference line between two endpoints.
///
/// Endpoints may lie outside the canvas; everything is clipped.
pub trait LineDrawer {
    /// Draw a line from `from` to `to` in `color`.
    fn draw_line(
        &self,
        canvas: &mut Canvas,
        from: Point,
        to: Point,
        color: Rgba8,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()>;
}

/// Straight segment.
#[derive(Clone, Copy, Debug)]
pub struct Beeline {
    thickness: u32,
}

impl Default for Beeline {
    fn default() -> Self {
        Self { thickness: 1 }
    }
}

impl Beeline {
    /// Straight line with a custom stroke width in pixels.
    pub fn with_thickness(thickness: u32) -> Self {
        Self {
            thickness: thickness.max(1),
        }
    }
}

impl LineDrawer for Beeline {
    fn draw_line(
        &self,
        canvas: &mut Canvas,
        from: Point,
        to: Point,
        color: Rgba8,
        _rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        stroke_segment(canvas, from, to, self.thickness, color);
        Ok(())
    }
}

/// Cubic Bezier through both endpoints with random interior control points.
#[derive(Clone, Copy, Debug)]
pub struct BezierCurve {
    thickness: u32,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self { thickness: 2 }
    }
}

impl BezierCurve {
    /// Curve with a custom stroke width in pixels.
    pub fn with_thickness(thickness: u32) -> Self {
        Self {
            thickness: thickness.max(1),
        }
    }
}

impl LineDrawer for BezierCurve {
    fn draw_line(
        &self,
        canvas: &mut Canvas,
        from: Point,
        to: Point,
        color: Rgba8,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        let h = f64::from(canvas.height().max(1));
        let c1 = Point::new(from.lerp(to, 1.0 / 3.0).x, rng.random_range(0.0..h));
        let c2 = Point::new(from.lerp(to, 2.0 / 3.0).x, rng.random_range(0.0..h));
        let curve = CubicBez::new(from, c1, c2, to);

        let n = sample_count(&[from, c1, c2, to]);
        let mut prev = curve.eval(0.0);
        for i in 1..=n {
            let p = curve.eval(i as f64 / n as f64);
            stroke_segment(canvas, prev, p, self.thickness, color);
            prev = p;
        }
        Ok(())
    }
}

/// Unfilled outline of a wide band that bends once between the endpoints.
#[derive(Clone, Copy, Debug)]
pub struct HollowLine {
    min_width: f64,
    max_width: f64,
}

impl Default for HollowLine {
    fn default() -> Self {
        Self {
            min_width: 4.0,
            max_width: 8.0,
        }
    }
}

impl HollowLine {
    /// Hollow band whose width is drawn from `[min_width, max_width]`.
    pub fn with_width(min_width: f64, max_width: f64) -> Self {
        let min_width = min_width.max(2.0);
        Self {
            min_width,
            max_width: max_width.max(min_width),
        }
    }
}

impl LineDrawer for HollowLine {
    fn draw_line(
        &self,
        canvas: &mut Canvas,
        from: Point,
        to: Point,
        color: Rgba8,
        rng: &mut dyn RngCore,
    ) -> CaptchaResult<()> {
        let h = f64::from(canvas.height().max(1));
        let half = rng.random_range(self.min_width..=self.max_width) / 2.0;
        let ctrl = Point::new(from.midpoint(to).x, rng.random_range(0.0..h));
        let curve = QuadBez::new(from, ctrl, to);

        let n = sample_count(&[from, ctrl, to]);
        let mut upper = Vec::with_capacity(n + 1);
        let mut lower = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let p = curve.eval(t);
            let d = curve.eval((t + 1e-3).min(1.0)) - curve.eval((t - 1e-3).max(0.0));
            let len = d.hypot();
            let (nx, ny) = if len > 0.0 {
                (-d.y / len, d.x / len)
            } else {
                (0.0, 1.0)
            };
            upper.push(Point::new(p.x + nx * half, p.y + ny * half));
            lower.push(Point::new(p.x - nx * half, p.y - ny * half));
        }

        for edge in [&upper, &lower] {
            for w in edge.windows(2) {
                stroke_segment(canvas, w[0], w[1], 1, color);
            }
        }
        // End caps close the outline.
        stroke_segment(canvas, upper[0], lower[0], 1, color);
        stroke_segment(canvas, upper[n], lower[n], 1, color);
        Ok(())
    }
}

fn sample_count(ctrl: &[Point]) -> usize {
    let hull: f64 = ctrl.windows(2).map(|w| w[0].distance(w[1])).sum();
    if hull.is_finite() {
        (hull.ceil() as usize).clamp(8, MAX_CURVE_SAMPLES)
    } else {
        8
    }
}

/// Clip a segment to `[min, max]` on both axes (Liang-Barsky).
pub(crate) fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.x - min.x),
        (dx, max.x - a.x),
        (-dy, a.y - min.y),
        (dy, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((a.lerp(b, t0), a.lerp(b, t1)))
}

/// Bresenham segment stamped with a square brush of `thickness` pixels.
pub(crate) fn stroke_segment(canvas: &mut Canvas, a: Point, b: Point, thickness: u32, color: Rgba8) {
    if canvas.is_empty() {
        return;
    }
    let pad = f64::from(thickness);
    let min = Point::new(-pad, -pad);
    let max = Point::new(
        f64::from(canvas.width()) - 1.0 + pad,
        f64::from(canvas.height()) - 1.0 + pad,
    );
    let Some((a, b)) = clip_segment(a, b, min, max) else {
        return;
    };

    let (mut x, mut y) = (a.x.round() as i64, a.y.round() as i64);
    let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let lo = -(i64::from(thickness) - 1) / 2;
    let hi = lo + i64::from(thickness);
    loop {
        for oy in lo..hi {
            for ox in lo..hi {
                canvas.blend(x + ox, y + oy, color);
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/line.rs"]
mod tests;
