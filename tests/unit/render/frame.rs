use super::*;
use crate::foundation::core::Viewport;

fn scratch(name: &str) -> ArtifactDir {
    let dir = std::env::temp_dir().join(format!(
        "fractal_reel_frame_{name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    ArtifactDir::create(dir, "ppm").unwrap()
}

fn job(index: u32) -> FrameJob {
    FrameJob {
        index,
        viewport: Viewport::new(-2.0, 1.0, -1.25, 1.25).unwrap(),
        width: 64,
        height: 48,
        max_iter: 250,
    }
}

enum Behavior {
    Write,
    Silent,
    Fail,
}

struct StubRenderer(Behavior);

impl Renderer for StubRenderer {
    fn render(
        &self,
        _job: &FrameJob,
        output: &Path,
        _cancel: &CancelToken,
    ) -> Result<(), ToolFailure> {
        match self.0 {
            Behavior::Write => {
                std::fs::write(output, b"P6\n1 1\n255\n\0\0\0").unwrap();
                Ok(())
            }
            Behavior::Silent => Ok(()),
            Behavior::Fail => Err(ToolFailure::Exit {
                code: Some(2),
                program: "stub".to_string(),
                stderr: "bad viewport".to_string(),
            }),
        }
    }
}

#[test]
fn render_args_follow_renderer_contract() {
    let args = render_args(&job(3), Path::new("tmp/frame_000003.ppm"));
    let args: Vec<String> = args
        .into_iter()
        .map(|a| a.into_string().unwrap())
        .collect();
    assert_eq!(
        args,
        vec![
            "--width",
            "64",
            "--height",
            "48",
            "--iter",
            "250",
            "--xmin",
            "-2",
            "--xmax",
            "1",
            "--ymin",
            "-1.25",
            "--ymax",
            "1.25",
            "--output",
            "tmp/frame_000003.ppm",
        ]
    );
}

#[test]
fn successful_render_with_artifact_is_ok() {
    let dir = scratch("ok");
    let stub = StubRenderer(Behavior::Write);
    let result = FrameRenderer::new(&stub, &dir).render(&job(4), &CancelToken::new());
    assert!(result.ok);
    assert_eq!(result.index, 4);
    assert_eq!(result.artifact_path, dir.frame_path(4));
    assert!(result.failure.is_none());
    assert!(result.into_result().is_ok());
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn zero_exit_without_artifact_is_a_failure() {
    let dir = scratch("silent");
    let stub = StubRenderer(Behavior::Silent);
    let result = FrameRenderer::new(&stub, &dir).render(&job(0), &CancelToken::new());
    assert!(!result.ok);
    assert!(matches!(
        result.failure,
        Some(ToolFailure::MissingOutput { .. })
    ));
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn stale_artifact_does_not_mask_a_silent_renderer() {
    let dir = scratch("stale");
    std::fs::write(dir.frame_path(1), b"old").unwrap();
    let stub = StubRenderer(Behavior::Silent);
    let result = FrameRenderer::new(&stub, &dir).render(&job(1), &CancelToken::new());
    assert!(!result.ok);
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn undeletable_stale_artifact_fails_the_frame_without_rendering() {
    let dir = scratch("stale_dir");
    std::fs::create_dir_all(dir.frame_path(5)).unwrap();
    let stub = StubRenderer(Behavior::Fail);
    let result = FrameRenderer::new(&stub, &dir).render(&job(5), &CancelToken::new());
    assert!(!result.ok);
    assert!(matches!(
        result.failure,
        Some(ToolFailure::StaleOutput { .. })
    ));
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn non_zero_exit_is_reported_with_stderr() {
    let dir = scratch("fail");
    let stub = StubRenderer(Behavior::Fail);
    let result = FrameRenderer::new(&stub, &dir).render(&job(2), &CancelToken::new());
    assert!(!result.ok);
    let err = result.into_result().unwrap_err();
    assert!(matches!(err, ReelError::Render { index: 2, .. }));
    assert!(err.to_string().contains("bad viewport"));
    let _ = std::fs::remove_dir_all(dir.path());
}

#[test]
fn missing_executable_is_a_missing_tool() {
    let err = ProcessRenderer::new("definitely/not/here/mandelbrot_cpu").unwrap_err();
    assert!(matches!(
        err,
        ReelError::MissingTool {
            role: ToolRole::Renderer,
            ..
        }
    ));
}

#[test]
fn explicit_renderer_path_wins() {
    let p = locate_renderer(Some(Path::new("/opt/mandel/bin/render")));
    assert_eq!(p, PathBuf::from("/opt/mandel/bin/render"));
}
