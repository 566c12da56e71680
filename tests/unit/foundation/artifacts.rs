use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fractal_reel_artifacts_{name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn frame_names_are_zero_padded_to_six_digits() {
    assert_eq!(frame_file_name(0, "ppm"), "frame_000000.ppm");
    assert_eq!(frame_file_name(42, "png"), "frame_000042.png");
    assert_eq!(frame_file_name(999_999, "ppm"), "frame_999999.ppm");
}

#[test]
fn artifact_convention_matches_only_frame_files() {
    assert!(is_frame_artifact("frame_000000.ppm"));
    assert!(is_frame_artifact("frame_000123.png"));
    assert!(is_frame_artifact("frame_1000000.ppm"));
    assert!(!is_frame_artifact("frame_00001.ppm"));
    assert!(!is_frame_artifact("frame_00000a.ppm"));
    assert!(!is_frame_artifact("frame_000001"));
    assert!(!is_frame_artifact("frame_000001.tar.gz"));
    assert!(!is_frame_artifact("notes.txt"));
    assert!(!is_frame_artifact("mandelbrot_animation.mp4"));
}

#[test]
fn input_pattern_matches_frame_names() {
    let dir = ArtifactDir::create(scratch("pattern"), "ppm").unwrap();
    let pattern = dir.input_pattern();
    assert_eq!(
        pattern.file_name().and_then(|n| n.to_str()),
        Some("frame_%06d.ppm")
    );
    assert_eq!(
        dir.frame_path(7).file_name().and_then(|n| n.to_str()),
        Some("frame_000007.ppm")
    );
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn create_rejects_bad_extension() {
    assert!(ArtifactDir::create(scratch("bad_ext"), "").is_err());
    assert!(ArtifactDir::create(scratch("bad_ext"), ".ppm").is_err());
    assert!(ArtifactDir::create(scratch("bad_ext"), "a/b").is_err());
}

#[test]
fn purge_removes_frames_and_keeps_directory_and_other_files() {
    let root = scratch("purge");
    let dir = ArtifactDir::create(&root, "ppm").unwrap();
    for i in 0..3 {
        std::fs::write(dir.frame_path(i), b"P6").unwrap();
        std::fs::write(dir.frame_path_with_ext(i, "png"), b"png").unwrap();
    }
    std::fs::write(root.join("keep.txt"), b"x").unwrap();

    assert_eq!(dir.purge().unwrap(), 6);
    assert!(root.is_dir());
    let left: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(left, vec!["keep.txt".to_string()]);

    std::fs::remove_file(root.join("keep.txt")).unwrap();
    assert_eq!(dir.purge().unwrap(), 0);
    assert!(root.is_dir());
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn purge_recreates_missing_directory() {
    let root = scratch("recreate");
    let dir = ArtifactDir::create(&root, "ppm").unwrap();
    std::fs::remove_dir_all(&root).unwrap();
    assert_eq!(dir.purge().unwrap(), 0);
    assert!(root.is_dir());
    let _ = std::fs::remove_dir_all(&root);
}
