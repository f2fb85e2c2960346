use super::*;

#[test]
fn defaults_match_documented_values() {
    let save = SaveOptions::default();
    assert_eq!(save.format, ImageFormat::Png);
    assert!(!save.transparent);
    assert_eq!(save.background, Rgba8::WHITE);

    let video = VideoEncodeOpts::default();
    assert_eq!(video.crf, 24);
    assert_eq!(video.vcodec, "libx264");
    assert_eq!(video.pix_fmt, "yuv420p");

    let opts = AnimateOpts::default();
    assert_eq!(opts.max_payload_bytes, 1_000_000);
    assert_eq!(opts.video_name, PathBuf::from("video.mp4"));
    assert!(opts.validate().is_ok());
}

#[test]
fn validation_rejects_bad_values() {
    let save = SaveOptions {
        dpi: Some(0.0),
        ..SaveOptions::default()
    };
    assert!(matches!(save.validate(), Err(AnimError::Config(_))));

    let save = SaveOptions {
        format: ImageFormat::Jpeg,
        transparent: true,
        ..SaveOptions::default()
    };
    assert!(save.validate().is_err());

    let video = VideoEncodeOpts {
        crf: 60,
        ..VideoEncodeOpts::default()
    };
    assert!(video.validate().is_err());

    let opts = AnimateOpts {
        fps: Fps { num: 0, den: 1 },
        ..AnimateOpts::default()
    };
    assert!(opts.validate().is_err());
}

#[test]
fn save_options_parse_from_json() {
    let save: SaveOptions =
        serde_json::from_str(r#"{ "format": "jpeg", "dpi": 200 }"#).unwrap();
    assert_eq!(save.format, ImageFormat::Jpeg);
    assert_eq!(save.dpi, Some(200.0));
    assert!(serde_json::from_str::<SaveOptions>(r#"{ "bogus": 1 }"#).is_err());
}
