use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::foundation::artifacts::ArtifactDir;
use crate::foundation::core::CancelToken;
use crate::foundation::error::{ReelError, ReelResult, ToolFailure, ToolRole};
use crate::foundation::process::run_tool;
use crate::sequence::sequencer::FrameJob;

/// Default wall-clock budget for one frame.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(300);

/// Paths probed, in order, when no renderer executable is given.
pub const RENDERER_CANDIDATES: [&str; 4] = [
    "./build/mandelbrot_cpu",
    "../build/mandelbrot_cpu",
    "./mandelbrot_cpu",
    "build/mandelbrot_cpu",
];

/// Capability: produce one raster image for a job.
pub trait Renderer: Send + Sync {
    /// Render `job` into `output`. Returning `Ok` does not by itself mean the file exists;
    /// [`FrameRenderer`] checks that separately.
    fn render(&self, job: &FrameJob, output: &Path, cancel: &CancelToken)
    -> Result<(), ToolFailure>;
}

/// Argument vector passed to the renderer executable for `job`.
pub fn render_args(job: &FrameJob, output: &Path) -> Vec<OsString> {
    let v = &job.viewport;
    let mut args: Vec<OsString> = [
        ("--width", job.width.to_string()),
        ("--height", job.height.to_string()),
        ("--iter", job.max_iter.to_string()),
        ("--xmin", v.x_min.to_string()),
        ("--xmax", v.x_max.to_string()),
        ("--ymin", v.y_min.to_string()),
        ("--ymax", v.y_max.to_string()),
    ]
    .into_iter()
    .flat_map(|(flag, value)| [OsString::from(flag), OsString::from(value)])
    .collect();
    args.push("--output".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// Pick the renderer executable: `explicit` if given, else the first existing candidate, else the
/// first candidate (which will then fail the existence check in [`ProcessRenderer::new`]).
pub fn locate_renderer(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    RENDERER_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(RENDERER_CANDIDATES[0]))
}

/// [`Renderer`] backed by an external executable.
#[derive(Clone, Debug)]
pub struct ProcessRenderer {
    executable: PathBuf,
    timeout: Duration,
}

impl ProcessRenderer {
    /// Use `executable`, which must exist.
    pub fn new(executable: impl Into<PathBuf>) -> ReelResult<Self> {
        let executable = executable.into();
        if !executable.exists() {
            return Err(ReelError::MissingTool {
                role: ToolRole::Renderer,
                program: executable.display().to_string(),
            });
        }
        Ok(Self {
            executable,
            timeout: DEFAULT_RENDER_TIMEOUT,
        })
    }

    /// Override the per-frame timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Renderer for ProcessRenderer {
    fn render(
        &self,
        job: &FrameJob,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<(), ToolFailure> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(render_args(job, output));
        run_tool(cmd, self.timeout, cancel)
    }
}

/// Outcome of rendering one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    /// Frame index.
    pub index: u32,
    /// Where the artifact is (or should have been) written.
    pub artifact_path: PathBuf,
    /// Zero exit status and artifact present.
    pub ok: bool,
    /// Reason when `ok` is false.
    pub failure: Option<ToolFailure>,
}

impl FrameResult {
    /// Convert into a run-level result.
    pub fn into_result(self) -> ReelResult<PathBuf> {
        match self.failure {
            None => Ok(self.artifact_path),
            Some(failure) => Err(ReelError::from_render(self.index, failure)),
        }
    }
}

/// Renders jobs into an [`ArtifactDir`] and verifies each artifact.
pub struct FrameRenderer<'a> {
    renderer: &'a dyn Renderer,
    artifacts: &'a ArtifactDir,
}

impl<'a> FrameRenderer<'a> {
    /// Render with `renderer` into `artifacts`.
    pub fn new(renderer: &'a dyn Renderer, artifacts: &'a ArtifactDir) -> Self {
        Self {
            renderer,
            artifacts,
        }
    }

    /// Render one job. Never panics and never aborts the caller; failure is in the result.
    #[tracing::instrument(skip_all, fields(index = job.index))]
    pub fn render(&self, job: &FrameJob, cancel: &CancelToken) -> FrameResult {
        let artifact_path = self.artifacts.frame_path(job.index);

        let outcome = remove_stale(&artifact_path)
            .and_then(|()| self.renderer.render(job, &artifact_path, cancel))
            .and_then(|()| {
                if artifact_path.is_file() {
                    Ok(())
                } else {
                    Err(ToolFailure::MissingOutput {
                        path: artifact_path.clone(),
                    })
                }
            });

        match outcome {
            Ok(()) => {
                tracing::debug!(path = %artifact_path.display(), "frame rendered");
                FrameResult {
                    index: job.index,
                    artifact_path,
                    ok: true,
                    failure: None,
                }
            }
            Err(failure) => {
                tracing::warn!(%failure, "frame failed");
                FrameResult {
                    index: job.index,
                    artifact_path,
                    ok: false,
                    failure: Some(failure),
                }
            }
        }
    }
}

// A stale artifact from an earlier run would satisfy the existence check after rendering.
fn remove_stale(path: &Path) -> Result<(), ToolFailure> {
    if !path.exists() {
        return Ok(());
    }
    std::fs::remove_file(path).map_err(|e| ToolFailure::StaleOutput {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
