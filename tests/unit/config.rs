use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = GeneratorConfig::default();
    assert_eq!((cfg.width, cfg.height, cfg.length), (180, 60, 4));
    assert_eq!(cfg.difficulty, Difficulty::Easy);
    assert_eq!(cfg.format, ImageFormat::Jpeg);
    assert!(cfg.seed.is_none() && cfg.font_dirs.is_empty());
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = GeneratorConfig::from_json_str(
        r#"{ "width": 240, "format": "png", "seed": 7, "charset": "clean" }"#,
    )
    .unwrap();
    assert_eq!(cfg.width, 240);
    assert_eq!(cfg.height, 60);
    assert_eq!(cfg.format, ImageFormat::Png);
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.effective_charset(), Charset::Clean);
}

#[test]
fn charset_defaults_to_difficulty() {
    let cfg = GeneratorConfig {
        difficulty: Difficulty::Hard,
        ..GeneratorConfig::default()
    };
    assert_eq!(cfg.effective_charset(), Charset::Clean);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let base = GeneratorConfig::default();
    for bad in [
        GeneratorConfig {
            width: 0,
            ..base.clone()
        },
        GeneratorConfig {
            height: MAX_SIDE_PX + 1,
            ..base.clone()
        },
        GeneratorConfig {
            length: 0,
            ..base.clone()
        },
        GeneratorConfig {
            length: MAX_TEXT_LEN + 1,
            ..base.clone()
        },
    ] {
        assert!(matches!(bad.validate(), Err(CaptchaError::Validation(_))));
    }
}

#[test]
fn bad_json_is_a_validation_error() {
    for s in [
        "not json",
        r#"{ "format": "bmp" }"#,
        r#"{ "colour": "red" }"#,
        r#"{ "length": 0 }"#,
    ] {
        let err = GeneratorConfig::from_json_str(s).unwrap_err();
        assert!(matches!(err, CaptchaError::Validation(_)), "{s}: {err}");
    }
}

#[test]
fn missing_file_is_io() {
    let err = GeneratorConfig::from_json_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, CaptchaError::Io(_)));
}

#[test]
fn serializes_back_to_equal_config() {
    let cfg = GeneratorConfig {
        seed: Some(1),
        font_dirs: vec![PathBuf::from("fonts")],
        ..GeneratorConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(GeneratorConfig::from_json_str(&json).unwrap(), cfg);
}
