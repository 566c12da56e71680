use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::Render {
            index: 3,
            failure: ToolFailure::MissingOutput {
                path: PathBuf::from("t/frame_000003.ppm"),
            },
        }
        .to_string()
        .contains("render error: frame 3")
    );
    assert!(
        ReelError::NoFrames
            .to_string()
            .contains("assembly error:")
    );
}

#[test]
fn not_found_maps_to_missing_tool_not_runtime_failure() {
    let err = ReelError::from_assembly(ToolFailure::NotFound {
        program: "ffmpeg".to_string(),
    });
    assert!(matches!(
        err,
        ReelError::MissingTool {
            role: ToolRole::Encoder,
            ..
        }
    ));
    assert!(err.to_string().contains("missing encoder"));

    let err = ReelError::from_render(
        0,
        ToolFailure::NotFound {
            program: "./build/mandelbrot_cpu".to_string(),
        },
    );
    assert!(matches!(
        err,
        ReelError::MissingTool {
            role: ToolRole::Renderer,
            ..
        }
    ));
}

#[test]
fn interrupted_is_never_reported_as_a_frame_failure() {
    assert!(matches!(
        ReelError::from_render(7, ToolFailure::Interrupted),
        ReelError::Interrupted
    ));
    assert!(matches!(
        ReelError::from_assembly(ToolFailure::Interrupted),
        ReelError::Interrupted
    ));
}

#[test]
fn exit_failure_surfaces_stderr_verbatim() {
    let failure = ToolFailure::Exit {
        code: Some(1),
        program: "ffmpeg".to_string(),
        stderr: "Unknown encoder 'libx264'".to_string(),
    };
    let msg = ReelError::from_assembly(failure).to_string();
    assert!(msg.contains("status 1"));
    assert!(msg.contains("Unknown encoder 'libx264'"));

    let killed = ToolFailure::Exit {
        code: None,
        program: "r".to_string(),
        stderr: String::new(),
    };
    assert!(killed.to_string().contains("a signal"));
}

#[test]
fn timeout_mentions_budget() {
    let failure = ToolFailure::Timeout {
        program: "mandelbrot_cpu".to_string(),
        after: Duration::from_secs(300),
    };
    assert!(failure.to_string().contains("timed out after 300s"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
