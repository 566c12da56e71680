use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::artifacts::ArtifactDir;
use crate::foundation::core::CancelToken;
use crate::foundation::error::{ReelError, ReelResult, ToolFailure};
use crate::foundation::process::{is_on_path, run_tool};

/// Default wall-clock budget for the encode step.
pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(600);

/// Fixed encoding parameters. The defaults favour playback compatibility over encode speed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeProfile {
    /// Video codec passed to `-c:v`.
    pub codec: String,
    /// Output pixel format passed to `-pix_fmt`.
    pub pixel_format: String,
    /// Constant-quality factor passed to `-crf` (lower is better).
    pub crf: u8,
    /// Speed/quality preset passed to `-preset`.
    pub preset: String,
}

impl Default for EncodeProfile {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            crf: 18,
            preset: "slow".to_string(),
        }
    }
}

/// Everything the encoder needs for one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeRequest {
    /// printf-style input pattern, e.g. `temp_frames/frame_%06d.ppm`.
    pub input_pattern: PathBuf,
    /// Number of frames the pattern covers, starting at index 0.
    pub frame_count: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Container file to write.
    pub output: PathBuf,
}

/// Capability: turn an ordered image sequence into a video file.
pub trait Encoder: Send + Sync {
    /// Encode `request`. Called at most once per run.
    fn encode(&self, request: &EncodeRequest, cancel: &CancelToken) -> Result<(), ToolFailure>;
}

/// [`Encoder`] backed by the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
    profile: EncodeProfile,
    timeout: Duration,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            profile: EncodeProfile::default(),
            timeout: DEFAULT_ENCODE_TIMEOUT,
        }
    }
}

impl FfmpegEncoder {
    /// `ffmpeg` from `PATH` with the default profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `ffmpeg` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different encoding profile.
    pub fn with_profile(mut self, profile: EncodeProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Override the encode timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the configured program answers `-version`.
    pub fn is_available(&self) -> bool {
        is_on_path(&self.program.to_string_lossy())
    }

    /// Program that will be invoked.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument vector for `request`.
    pub fn args(&self, request: &EncodeRequest) -> Vec<OsString> {
        let p = &self.profile;
        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-r"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(request.fps.to_string().into());
        args.push("-i".into());
        args.push(request.input_pattern.as_os_str().to_owned());
        // The pattern alone reads every consecutive file, including leftovers past this run.
        args.push("-frames:v".into());
        args.push(request.frame_count.to_string().into());
        for (flag, value) in [
            ("-c:v", p.codec.clone()),
            ("-pix_fmt", p.pixel_format.clone()),
            ("-crf", p.crf.to_string()),
            ("-preset", p.preset.clone()),
        ] {
            args.push(flag.into());
            args.push(value.into());
        }
        args.push(request.output.as_os_str().to_owned());
        args
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest, cancel: &CancelToken) -> Result<(), ToolFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(request));
        run_tool(cmd, self.timeout, cancel)
    }
}

/// Successful assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Video file written.
    pub output: PathBuf,
    /// Its size in bytes.
    pub bytes: u64,
    /// Frames it was built from.
    pub frame_count: u32,
}

impl AssemblyReport {
    /// Output size in MiB.
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Runs the encoder once over a complete artifact set.
pub struct VideoAssembler<'a> {
    encoder: &'a dyn Encoder,
}

impl<'a> VideoAssembler<'a> {
    /// Assemble with `encoder`.
    pub fn new(encoder: &'a dyn Encoder) -> Self {
        Self { encoder }
    }

    /// Encode frames `0..frame_count` of `artifacts` into `output`.
    ///
    /// Refuses an empty frame set without invoking the encoder. Exit 0 alone is not success: the
    /// output file must exist afterwards.
    #[tracing::instrument(skip(self, artifacts, cancel), fields(dir = %artifacts.path().display()))]
    pub fn assemble(
        &self,
        artifacts: &ArtifactDir,
        frame_count: u32,
        fps: u32,
        output: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<AssemblyReport> {
        if frame_count == 0 {
            return Err(ReelError::NoFrames);
        }
        if fps == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        // A gap in the numbered sequence makes ffmpeg stop early without an error.
        if let Some(missing) = (0..frame_count)
            .map(|i| artifacts.frame_path(i))
            .find(|p| !p.is_file())
        {
            return Err(ReelError::Assembly(ToolFailure::MissingOutput { path: missing }));
        }
        ensure_parent_dir(output)?;

        let request = EncodeRequest {
            input_pattern: artifacts.input_pattern(),
            frame_count,
            fps,
            output: output.to_path_buf(),
        };
        tracing::info!(frames = frame_count, fps, "assembling video");
        self.encoder
            .encode(&request, cancel)
            .map_err(ReelError::from_assembly)?;

        let meta = std::fs::metadata(output).map_err(|_| {
            ReelError::Assembly(ToolFailure::MissingOutput {
                path: output.to_path_buf(),
            })
        })?;
        let report = AssemblyReport {
            output: output.to_path_buf(),
            bytes: meta.len(),
            frame_count,
        };
        tracing::info!(
            output = %report.output.display(),
            bytes = report.bytes,
            "video written"
        );
        Ok(report)
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
