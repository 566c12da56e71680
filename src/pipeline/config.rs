use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::ffmpeg::{EncodeProfile, FfmpegEncoder};
use crate::foundation::artifacts::validate_ext;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::ProcessRenderer;

/// What to do with frame artifacts after a successful run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgePolicy {
    /// Leave them in place.
    Keep,
    /// Delete them.
    Purge,
    /// Leave the decision to the caller. The driver keeps them; an interactive front end may
    /// prompt and call [`PipelineDriver::purge`](crate::PipelineDriver::purge).
    #[default]
    Ask,
}

/// Frame-level parallelism.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames on a rayon pool instead of one at a time.
    pub parallel: bool,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Run configuration. Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory for the final video; relative output names resolve against it.
    pub output_dir: PathBuf,
    /// Artifact directory, relative to `output_dir`.
    pub temp_subdir: PathBuf,
    /// Extension the renderer writes.
    pub artifact_ext: String,
    /// Per-frame timeout in seconds.
    pub render_timeout_secs: u64,
    /// Encode timeout in seconds.
    pub encode_timeout_secs: u64,
    /// Output frame rate.
    pub fps: u32,
    /// Purge artifacts before rendering.
    pub purge_before_run: bool,
    /// What to do with artifacts after success.
    pub purge_after_success: PurgePolicy,
    /// Frame-level parallelism.
    pub threading: RenderThreading,
    /// Encoder settings.
    pub encode_profile: EncodeProfile,
    /// Convert every rendered frame to PNG with the converter.
    pub png_previews: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            temp_subdir: PathBuf::from("temp_frames"),
            artifact_ext: "ppm".to_string(),
            render_timeout_secs: 300,
            encode_timeout_secs: 600,
            fps: 30,
            purge_before_run: false,
            purge_after_success: PurgePolicy::Ask,
            threading: RenderThreading::default(),
            encode_profile: EncodeProfile::default(),
            png_previews: false,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| ReelError::validation(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> ReelResult<()> {
        if self.fps == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if self.render_timeout_secs == 0 || self.encode_timeout_secs == 0 {
            return Err(ReelError::validation("timeouts must be non-zero"));
        }
        if self.threading.threads == Some(0) {
            return Err(ReelError::validation(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        validate_ext(&self.artifact_ext)
    }

    /// Artifact directory path.
    pub fn temp_dir(&self) -> PathBuf {
        self.output_dir.join(&self.temp_subdir)
    }

    /// Where the video named `name` goes. Absolute paths are kept as given.
    pub fn output_path(&self, name: &Path) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Per-frame timeout.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Encode timeout.
    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs)
    }

    /// Process renderer for `executable` with this config's timeout.
    pub fn process_renderer(&self, executable: impl Into<PathBuf>) -> ReelResult<ProcessRenderer> {
        Ok(ProcessRenderer::new(executable)?.with_timeout(self.render_timeout()))
    }

    /// ffmpeg encoder with this config's profile and timeout.
    pub fn ffmpeg_encoder(&self) -> FfmpegEncoder {
        FfmpegEncoder::new()
            .with_profile(self.encode_profile.clone())
            .with_timeout(self.encode_timeout())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
