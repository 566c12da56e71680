use std::path::PathBuf;
use std::time::Duration;

/// Result alias used throughout the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Which external collaborator a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolRole {
    /// The single-frame fractal renderer.
    Renderer,
    /// The video encoder (`ffmpeg`).
    Encoder,
    /// The optional image-format converter.
    Converter,
}

impl std::fmt::Display for ToolRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Renderer => "renderer",
            Self::Encoder => "encoder",
            Self::Converter => "converter",
        })
    }
}

/// One failed external call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ToolFailure {
    /// The program could not be located.
    #[error("'{program}' was not found")]
    NotFound {
        /// Program that was invoked.
        program: String,
    },

    /// The program exists but could not be started.
    #[error("failed to spawn '{program}': {message}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// OS-level reason.
        message: String,
    },

    /// The wall-clock budget ran out and the child was killed.
    #[error("'{program}' timed out after {after:?}")]
    Timeout {
        /// Program that was invoked.
        program: String,
        /// Budget that was exceeded.
        after: Duration,
    },

    /// The program ran and exited unsuccessfully.
    #[error("'{program}' exited with {}: {stderr}", exit_label(.code))]
    Exit {
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Program that was invoked.
        program: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The program exited 0 but the expected file is absent.
    #[error("expected output '{}' was not produced", .path.display())]
    MissingOutput {
        /// Path that should exist.
        path: PathBuf,
    },

    /// An artifact left by an earlier run could not be removed before rendering.
    #[error("could not remove stale output '{}': {message}", .path.display())]
    StaleOutput {
        /// Artifact that is still present.
        path: PathBuf,
        /// OS-level reason.
        message: String,
    },

    /// The call was abandoned because the run was cancelled.
    #[error("interrupted")]
    Interrupted,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Crate error type.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Input rejected before any external call.
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator binary is absent.
    #[error("missing {role}: '{program}' not found")]
    MissingTool {
        /// Collaborator kind.
        role: ToolRole,
        /// Program or path that was looked up.
        program: String,
    },

    /// A frame failed and the run was stopped there.
    #[error("render error: frame {index}: {failure}")]
    Render {
        /// Index of the failed frame.
        index: u32,
        /// What went wrong.
        failure: ToolFailure,
    },

    /// The encoder was not invoked because no frames were available.
    #[error("assembly error: no frames to assemble")]
    NoFrames,

    /// The encoder ran and failed, or timed out.
    #[error("assembly error: {0}")]
    Assembly(ToolFailure),

    /// The run was cancelled by the user.
    #[error("interrupted by user")]
    Interrupted,

    /// Unexpected fault, typically I/O on the artifact directory.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Map a tool failure observed while rendering frame `index`.
    ///
    /// `NotFound` becomes [`ReelError::MissingTool`] and `Interrupted` becomes
    /// [`ReelError::Interrupted`], so they never read as a frame failure.
    pub fn from_render(index: u32, failure: ToolFailure) -> Self {
        match failure {
            ToolFailure::NotFound { program } => Self::MissingTool {
                role: ToolRole::Renderer,
                program,
            },
            ToolFailure::Interrupted => Self::Interrupted,
            failure => Self::Render { index, failure },
        }
    }

    /// Map a tool failure observed while assembling the video.
    pub fn from_assembly(failure: ToolFailure) -> Self {
        match failure {
            ToolFailure::NotFound { program } => Self::MissingTool {
                role: ToolRole::Encoder,
                program,
            },
            ToolFailure::Interrupted => Self::Interrupted,
            failure => Self::Assembly(failure),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
