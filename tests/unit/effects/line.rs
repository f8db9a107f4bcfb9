use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

const BG: Rgba8 = Rgba8::opaque(255, 255, 255);
const INK: Rgba8 = Rgba8::opaque(0, 0, 0);

fn inked(c: &Canvas) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    for y in 0..i64::from(c.height()) {
        for x in 0..i64::from(c.width()) {
            if c.pixel(x, y) != Some(BG) {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn beeline_horizontal_covers_every_column_once() {
    let mut canvas = Canvas::new(20, 10, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    Beeline::default()
        .draw_line(
            &mut canvas,
            Point::new(0.0, 4.0),
            Point::new(19.0, 4.0),
            INK,
            &mut rng,
        )
        .unwrap();
    let px = inked(&canvas);
    assert_eq!(px.len(), 20);
    assert!(px.iter().all(|&(_, y)| y == 4));
}

#[test]
fn beeline_diagonal_connects_endpoints() {
    let mut canvas = Canvas::new(10, 10, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    Beeline::default()
        .draw_line(
            &mut canvas,
            Point::new(0.0, 0.0),
            Point::new(9.0, 9.0),
            INK,
            &mut rng,
        )
        .unwrap();
    for i in 0..10 {
        assert_eq!(canvas.pixel(i, i), Some(INK));
    }
    assert_eq!(inked(&canvas).len(), 10);
}

#[test]
fn thickness_widens_the_stroke() {
    let mut thin = Canvas::new(30, 15, BG).unwrap();
    let mut thick = Canvas::new(30, 15, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let (a, b) = (Point::new(2.0, 7.0), Point::new(27.0, 7.0));
    Beeline::default()
        .draw_line(&mut thin, a, b, INK, &mut rng)
        .unwrap();
    Beeline::with_thickness(3)
        .draw_line(&mut thick, a, b, INK, &mut rng)
        .unwrap();
    let thick = inked(&thick);
    assert!(thick.len() > 2 * inked(&thin).len());
    for y in 6..=8 {
        assert!(thick.iter().filter(|p| p.1 == y).count() >= 26);
    }
    assert!(thick.iter().all(|p| (6..=8).contains(&p.1)));
}

#[test]
fn far_out_endpoints_are_clipped_without_hanging() {
    let mut canvas = Canvas::new(50, 20, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    Beeline::default()
        .draw_line(
            &mut canvas,
            Point::new(-1.0e9, 10.0),
            Point::new(1.0e9, 10.0),
            INK,
            &mut rng,
        )
        .unwrap();
    assert_eq!(inked(&canvas).len(), 50);

    let mut untouched = Canvas::new(50, 20, BG).unwrap();
    Beeline::default()
        .draw_line(
            &mut untouched,
            Point::new(-100.0, -5.0),
            Point::new(-10.0, -50.0),
            INK,
            &mut rng,
        )
        .unwrap();
    assert!(inked(&untouched).is_empty());
}

#[test]
fn clip_segment_trims_to_box() {
    let (a, b) = clip_segment(
        Point::new(-10.0, 5.0),
        Point::new(30.0, 5.0),
        Point::new(0.0, 0.0),
        Point::new(19.0, 9.0),
    )
    .unwrap();
    assert!((a.x - 0.0).abs() < 1e-9 && (b.x - 19.0).abs() < 1e-9);
    assert!(clip_segment(
        Point::new(f64::NAN, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 0.0),
        Point::new(9.0, 9.0),
    )
    .is_none());
}

#[test]
fn curve_touches_both_edges_and_is_seeded() {
    let draw = |seed: u64| {
        let mut canvas = Canvas::new(120, 40, BG).unwrap();
        BezierCurve::default()
            .draw_line(
                &mut canvas,
                Point::new(1.0, 20.0),
                Point::new(118.0, 20.0),
                INK,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
        canvas
    };
    let a = draw(11);
    assert_eq!(a, draw(11));
    let px = inked(&a);
    assert!(px.iter().any(|&(x, _)| x <= 2));
    assert!(px.iter().any(|&(x, _)| x >= 117));
}

#[test]
fn hollow_line_leaves_its_core_unpainted() {
    let mut canvas = Canvas::new(100, 40, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    HollowLine::with_width(8.0, 8.0)
        .draw_line(
            &mut canvas,
            Point::new(-20.0, 20.0),
            Point::new(120.0, 20.0),
            INK,
            &mut rng,
        )
        .unwrap();
    let px = inked(&canvas);
    assert!(!px.is_empty());
    // Every column crosses two edges of the band with background in between.
    for x in [10i64, 50, 90] {
        let col: Vec<i64> = px.iter().filter(|p| p.0 == x).map(|p| p.1).collect();
        let (lo, hi) = (col.iter().min().unwrap(), col.iter().max().unwrap());
        assert!(hi - lo >= 4, "band too thin at x={x}");
        assert!(col.len() < (hi - lo + 1) as usize, "band filled at x={x}");
    }
}

#[test]
fn empty_canvas_is_a_no_op() {
    let mut canvas = Canvas::new(0, 0, BG).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    for drawer in [
        &Beeline::default() as &dyn LineDrawer,
        &BezierCurve::default(),
        &HollowLine::default(),
    ] {
        drawer
            .draw_line(
                &mut canvas,
                Point::new(0.0, 0.0),
                Point::new(5.0, 5.0),
                INK,
                &mut rng,
            )
            .unwrap();
    }
    assert!(canvas.data().is_empty());
}
