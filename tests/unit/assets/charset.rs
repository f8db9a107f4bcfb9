use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn random_text_has_exact_length_and_alphabet() {
    let mut rng = StdRng::seed_from_u64(11);
    for len in [0usize, 1, 4, 9, 64] {
        for set in [Charset::Full, Charset::Clean] {
            let text = random_text(&mut rng, len, set);
            assert_eq!(text.chars().count(), len);
            assert!(text.chars().all(|c| set.contains(c)));
        }
    }
}

#[test]
fn clean_set_drops_confusables() {
    for c in ['0', 'O', '1', 'I', 'B', '8', 'l', 'o'] {
        assert!(!Charset::Clean.contains(c), "{c}");
    }
    assert_eq!(Charset::Full.chars().len(), 62);
}

#[test]
fn same_seed_same_text() {
    let a = random_text(&mut StdRng::seed_from_u64(5), 8, Charset::Full);
    let b = random_text(&mut StdRng::seed_from_u64(5), 8, Charset::Full);
    assert_eq!(a, b);
}

#[test]
fn charset_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&Charset::Clean).unwrap(), "\"clean\"");
}
