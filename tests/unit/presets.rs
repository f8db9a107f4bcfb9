use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::assets::palette::{MIN_CONTRAST, contrast_ratio};
use crate::pipeline::TextKind;

fn twist_amplitude(r: &Recipe) -> f32 {
    r.stages
        .iter()
        .find_map(|s| match s {
            StageSpec::Text {
                kind: TextKind::Twist { amplitude, .. },
            } => Some(*amplitude),
            _ => None,
        })
        .unwrap_or(0.0)
}

fn blur_sigma(r: &Recipe) -> f32 {
    r.stages
        .iter()
        .find_map(|s| match s {
            StageSpec::Blur { sigma, .. } => Some(*sigma),
            _ => None,
        })
        .unwrap_or(0.0)
}

#[test]
fn border_is_always_first_and_text_appears_once() {
    for d in Difficulty::ALL {
        let r = d.recipe();
        assert!(matches!(r.stages[0], StageSpec::Border { .. }), "{d:?}");
        let texts = r
            .stages
            .iter()
            .filter(|s| matches!(s, StageSpec::Text { .. }))
            .count();
        assert_eq!(texts, 1, "{d:?}");
    }
}

#[test]
fn difficulty_is_monotonic() {
    for pair in Difficulty::ALL.windows(2) {
        let (easier, harder) = (pair[0].recipe(), pair[1].recipe());
        assert!(easier.noise_fraction() <= harder.noise_fraction());
        assert!(easier.line_count() <= harder.line_count());
        assert!(twist_amplitude(&easier) <= twist_amplitude(&harder));
        assert!(blur_sigma(&easier) <= blur_sigma(&harder));
    }
    assert!(Difficulty::VeryEasy < Difficulty::Hard);
}

#[test]
fn very_easy_is_untwisted_on_a_curated_pair() {
    let r = Difficulty::VeryEasy.recipe();
    assert_eq!(r.background, BackgroundStrategy::CuratedPair);
    assert_eq!(twist_amplitude(&r), 0.0);
    assert_eq!(r.noise_fraction(), 0.0);
    assert_eq!(blur_sigma(&r), 0.0);
}

#[test]
fn hard_carries_glyph_noise_and_three_lines() {
    let r = Difficulty::Hard.recipe();
    assert_eq!(r.line_count(), 3);
    assert!(r.stages.contains(&StageSpec::text_noise(NoiseDensity::High)));
    assert!(r.stages.contains(&StageSpec::Line {
        kind: LineKind::Hollow,
        color: ColorSpec::Light,
    }));
}

#[test]
fn picked_colors_are_readable() {
    let mut rng = StdRng::seed_from_u64(12);
    for strategy in [
        BackgroundStrategy::CuratedPair,
        BackgroundStrategy::RandomLightDeep,
    ] {
        for _ in 0..100 {
            let (bg, fg) = strategy.pick(&mut rng);
            assert!(contrast_ratio(bg, fg) >= MIN_CONTRAST, "{bg:?} vs {fg:?}");
        }
    }
}

#[test]
fn charsets_follow_difficulty() {
    assert_eq!(Difficulty::VeryEasy.default_charset(), Charset::Full);
    assert_eq!(Difficulty::Easy.default_charset(), Charset::Full);
    assert_eq!(Difficulty::Medium.default_charset(), Charset::Clean);
    assert_eq!(Difficulty::Hard.default_charset(), Charset::Clean);
}

#[test]
fn parses_and_serializes_names() {
    assert_eq!(
        "very-easy".parse::<Difficulty>().unwrap(),
        Difficulty::VeryEasy
    );
    assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    assert!(matches!(
        "insane".parse::<Difficulty>(),
        Err(CaptchaError::Validation(_))
    ));
    assert_eq!(
        serde_json::to_string(&Difficulty::VeryEasy).unwrap(),
        "\"very_easy\""
    );
}

#[test]
fn recipes_survive_json() {
    for d in Difficulty::ALL {
        let r = d.recipe();
        let json = serde_json::to_string(&r).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
