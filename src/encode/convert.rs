use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::foundation::core::CancelToken;
use crate::foundation::error::ToolFailure;
use crate::foundation::process::run_tool;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

/// Capability: convert one image file into another format.
pub trait Converter: Send + Sync {
    /// Convert `input` into `output`; the format follows from the output extension.
    fn convert(&self, input: &Path, output: &Path, cancel: &CancelToken)
    -> Result<(), ToolFailure>;
}

/// [`Converter`] backed by ImageMagick's `convert <in> <out>`.
#[derive(Clone, Debug)]
pub struct ImageMagickConverter {
    program: PathBuf,
}

impl Default for ImageMagickConverter {
    fn default() -> Self {
        Self {
            program: PathBuf::from("convert"),
        }
    }
}

impl ImageMagickConverter {
    /// `convert` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Converter for ImageMagickConverter {
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<(), ToolFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(input).arg(output);
        run_tool(cmd, CONVERT_TIMEOUT, cancel)
    }
}
