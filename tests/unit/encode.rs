use super::*;
use crate::foundation::core::Rgba8;

fn sample() -> Canvas {
    let mut c = Canvas::new(24, 10, Rgba8::opaque(240, 240, 240)).unwrap();
    for x in 0..24 {
        c.set(x, 5, Rgba8::opaque(10, 10, 120));
    }
    c
}

#[test]
fn parses_names_and_extensions() {
    assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
    assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
    assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
    assert_eq!(
        ImageFormat::from_extension(".gif").unwrap(),
        ImageFormat::Gif
    );
    let err = "bmp".parse::<ImageFormat>().unwrap_err();
    assert!(matches!(err, CaptchaError::UnsupportedFormat(ref s) if s == "bmp"));
    assert_eq!(err.to_string(), "unsupported image format 'bmp'");
}

#[test]
fn display_round_trips_through_from_str() {
    for f in ImageFormat::ALL {
        assert_eq!(f.to_string().parse::<ImageFormat>().unwrap(), f);
        assert_eq!(ImageFormat::from_extension(f.extension()).unwrap(), f);
        assert!(f.mime_type().starts_with("image/"));
    }
}

#[test]
fn every_format_decodes_to_the_canvas_size() {
    for f in ImageFormat::ALL {
        let bytes = encode_canvas(&sample(), f).unwrap();
        assert!(!bytes.is_empty());
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (24, 10), "{f}");
    }
}

#[test]
fn png_is_lossless() {
    let canvas = sample();
    let bytes = encode_canvas(&canvas, ImageFormat::Png).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.as_raw().as_slice(), canvas.data());
}

#[test]
fn magic_bytes_match_the_format() {
    let c = sample();
    assert!(
        encode_canvas(&c, ImageFormat::Png)
            .unwrap()
            .starts_with(b"\x89PNG")
    );
    assert!(
        encode_canvas(&c, ImageFormat::Jpeg)
            .unwrap()
            .starts_with(&[0xFF, 0xD8])
    );
    assert!(encode_canvas(&c, ImageFormat::Gif).unwrap().starts_with(b"GIF8"));
}

#[test]
fn empty_canvas_writes_nothing() {
    let mut out = Vec::new();
    let err = write_canvas(&Canvas::new(0, 0, Rgba8::TRANSPARENT).unwrap(), &mut out, ImageFormat::Png)
        .unwrap_err();
    assert!(matches!(err, CaptchaError::EmptyCanvas { .. }));
    assert!(out.is_empty());
}

#[test]
fn format_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&ImageFormat::Jpeg).unwrap(),
        "\"jpeg\""
    );
}
