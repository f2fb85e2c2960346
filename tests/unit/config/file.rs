use super::*;
use crate::config::options::ImageFormat;

#[test]
fn script_style_keys_are_accepted() {
    let cfg = AnimationConfig::from_json_str(
        r#"{
            "FPS": 6,
            "OUTPUT_FOLDER": "animation/example_01",
            "MAX_FRAMES": 42,
            "SAVE_OPTIONS": { "transparent": true }
        }"#,
    )
    .unwrap();
    let (folder, opts) = cfg.to_opts().unwrap();
    assert_eq!(folder, PathBuf::from("animation/example_01"));
    assert_eq!(opts.fps.num, 6);
    assert_eq!(opts.max_frames, Some(42));
    assert!(opts.save.transparent);
    assert_eq!(opts.save.format, ImageFormat::Png);
    assert_eq!(opts.max_payload_bytes, 1_000_000);
}

#[test]
fn missing_required_bindings_are_config_errors() {
    let cfg = AnimationConfig::from_json_str(r#"{ "output_folder": "out" }"#).unwrap();
    assert!(matches!(cfg.to_opts(), Err(AnimError::Config(_))));

    let cfg = AnimationConfig::from_json_str(r#"{ "fps": 10 }"#).unwrap();
    assert!(matches!(cfg.to_opts(), Err(AnimError::Config(_))));

    let cfg = AnimationConfig::from_json_str(r#"{ "fps": 0, "output_folder": "out" }"#).unwrap();
    assert!(cfg.to_opts().is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = AnimationConfig::from_json_str(r#"{ "fps": 10, "nope": true }"#).unwrap_err();
    assert!(matches!(err, AnimError::Serde(_)));
}

#[test]
fn from_path_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.json");
    std::fs::write(&path, r#"{ "fps": 20, "output_folder": "out", "workers": 2 }"#).unwrap();
    let cfg = AnimationConfig::from_path(&path).unwrap();
    assert_eq!(cfg.workers, 2);
    assert!(AnimationConfig::from_path(&dir.path().join("missing.json")).is_err());
}
