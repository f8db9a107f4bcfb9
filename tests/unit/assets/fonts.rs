use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "glyphwarp_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn empty_family_reports_no_fonts() {
    let family = FontFamily::new();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(family.is_empty());
    assert!(matches!(
        family.random_font(&mut rng),
        Err(CaptchaError::NoFonts)
    ));
}

#[test]
fn embedded_family_parses_bundled_fonts() {
    let family = FontFamily::with_embedded();
    assert_eq!(family.len(), embedded_fonts().len());
    assert_eq!(family.cached_len(), embedded_fonts().len());

    let mut rng = StdRng::seed_from_u64(2);
    let handle = family.random_font(&mut rng).unwrap();
    assert!(handle.key().starts_with("embedded/"));
}

#[test]
fn adding_same_bytes_twice_is_noop() {
    let family = FontFamily::new();
    let (_, bytes) = embedded_fonts()[0];
    family.add_font_bytes("a.ttf", bytes.to_vec()).unwrap();
    family.add_font_bytes("a.ttf", bytes.to_vec()).unwrap();
    assert_eq!(family.len(), 1);
}

#[test]
fn garbage_bytes_fail_to_parse() {
    let family = FontFamily::new();
    let err = family
        .add_font_bytes("junk.ttf", vec![0u8, 1, 2, 3])
        .unwrap_err();
    assert!(matches!(err, CaptchaError::Font(_)));
    assert!(family.is_empty());
}

#[test]
fn missing_file_and_dir_are_errors() {
    let family = FontFamily::new();
    assert!(family.add_font("does/not/exist.ttf").is_err());
    assert!(family.add_font_dir("does/not/exist").is_err());
    assert!(family.is_empty());
}

#[test]
fn font_dir_is_walked_recursively() {
    let tmp = temp_dir("font_dir");
    let nested = tmp.join("nested");
    std::fs::create_dir_all(&nested).unwrap();
    let (_, a) = embedded_fonts()[0];
    let (_, b) = embedded_fonts()[1];
    std::fs::write(tmp.join("a.ttf"), a).unwrap();
    std::fs::write(nested.join("b.TTF"), b).unwrap();
    std::fs::write(tmp.join("readme.txt"), b"not a font").unwrap();

    let family = FontFamily::new();
    assert_eq!(family.add_font_dir(&tmp).unwrap(), 2);
    assert_eq!(family.len(), 2);
    assert!(family.keys().unwrap().iter().all(|k| !k.contains('\\')));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn broken_font_in_dir_is_skipped() {
    let tmp = temp_dir("font_broken");
    std::fs::create_dir_all(&tmp).unwrap();
    std::fs::write(tmp.join("a_good.ttf"), embedded_fonts()[0].1).unwrap();
    std::fs::write(tmp.join("b_bad.otf"), b"garbage").unwrap();

    let family = FontFamily::new();
    assert_eq!(family.add_font_dir(&tmp).unwrap(), 1);
    assert_eq!(family.len(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn registered_fonts_parse_lazily_once() {
    let tmp = temp_dir("font_lazy");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("lazy.ttf");
    std::fs::write(&path, embedded_fonts()[0].1).unwrap();

    let family = FontFamily::new();
    family.register_font(&path).unwrap();
    assert_eq!(family.len(), 1);
    assert_eq!(family.cached_len(), 0);

    let mut rng = StdRng::seed_from_u64(3);
    family.random_font(&mut rng).unwrap();
    family.random_font(&mut rng).unwrap();
    assert_eq!(family.cached_len(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn concurrent_lookups_converge_on_one_entry() {
    let tmp = temp_dir("font_race");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("race.ttf");
    std::fs::write(&path, embedded_fonts()[1].1).unwrap();

    let family = Arc::new(FontFamily::new());
    family.register_font(&path).unwrap();

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let family = Arc::clone(&family);
            std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(i);
                family.random_font(&mut rng).map(|h| h.key().to_string())
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
    assert_eq!(family.cached_len(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn clear_empties_family() {
    let family = FontFamily::with_embedded();
    family.clear().unwrap();
    assert!(family.is_empty());
    assert_eq!(family.cached_len(), 0);
}

#[test]
fn default_fonts_is_shared() {
    let a = default_fonts();
    let b = default_fonts();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!a.is_empty());
}
