use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.temp_dir(), PathBuf::from("output").join("temp_frames"));
    assert_eq!(cfg.artifact_ext, "ppm");
    assert_eq!(cfg.render_timeout(), Duration::from_secs(300));
    assert_eq!(cfg.encode_timeout(), Duration::from_secs(600));
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.purge_after_success, PurgePolicy::Ask);
    assert!(!cfg.threading.parallel);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: PipelineConfig = serde_json::from_str(
        r#"{ "fps": 60, "purge_after_success": "purge", "threading": { "parallel": true } }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps, 60);
    assert_eq!(cfg.purge_after_success, PurgePolicy::Purge);
    assert!(cfg.threading.parallel);
    assert_eq!(cfg.threading.threads, None);
    assert_eq!(cfg.encode_profile.preset, "slow");
    assert_eq!(cfg.render_timeout_secs, 300);
}

#[test]
fn validate_rejects_unusable_values() {
    let bad = [
        PipelineConfig {
            fps: 0,
            ..Default::default()
        },
        PipelineConfig {
            render_timeout_secs: 0,
            ..Default::default()
        },
        PipelineConfig {
            artifact_ext: String::new(),
            ..Default::default()
        },
        PipelineConfig {
            threading: RenderThreading {
                parallel: true,
                threads: Some(0),
            },
            ..Default::default()
        },
    ];
    for cfg in bad {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }
}

#[test]
fn from_json_file_reports_bad_json_as_validation() {
    let path = std::env::temp_dir().join(format!(
        "fractal_reel_config_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, "{ \"fps\": \"fast\" }").unwrap();
    let err = PipelineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn output_path_resolves_relative_names() {
    let cfg = PipelineConfig::default();
    assert_eq!(
        cfg.output_path(Path::new("zoom.mp4")),
        PathBuf::from("output").join("zoom.mp4")
    );
}
