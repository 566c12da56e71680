use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Digits in a frame artifact index. Must agree with the `%06d` encoder input pattern.
pub const FRAME_INDEX_WIDTH: usize = 6;

/// File name of the artifact for frame `index`, e.g. `frame_000042.ppm`.
pub fn frame_file_name(index: u32, ext: &str) -> String {
    format!("frame_{index:0width$}.{ext}", width = FRAME_INDEX_WIDTH)
}

/// Whether `name` follows the frame artifact convention (`frame_<6+ digits>.<ext>`), for any
/// extension.
pub fn is_frame_artifact(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("frame_") else {
        return false;
    };
    let Some((digits, ext)) = rest.split_once('.') else {
        return false;
    };
    digits.len() >= FRAME_INDEX_WIDTH
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !ext.is_empty()
        && !ext.contains('.')
}

/// Directory holding the per-frame artifacts of one driver.
#[derive(Clone, Debug)]
pub struct ArtifactDir {
    root: PathBuf,
    ext: String,
}

impl ArtifactDir {
    /// Use `root` for artifacts with extension `ext`, creating the directory if absent.
    pub fn create(root: impl Into<PathBuf>, ext: impl Into<String>) -> ReelResult<Self> {
        let root = root.into();
        let ext = ext.into();
        validate_ext(&ext)?;
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create artifact directory '{}'", root.display()))?;
        Ok(Self { root, ext })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Renderer artifact extension.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Renderer artifact path for frame `index`.
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.root.join(frame_file_name(index, &self.ext))
    }

    /// Path for frame `index` with a different extension (converter output).
    pub fn frame_path_with_ext(&self, index: u32, ext: &str) -> PathBuf {
        self.root.join(frame_file_name(index, ext))
    }

    /// printf-style pattern matching every renderer artifact, e.g. `<dir>/frame_%06d.ppm`.
    pub fn input_pattern(&self) -> PathBuf {
        self.root.join(format!("frame_%0{FRAME_INDEX_WIDTH}d.{}", self.ext))
    }

    /// Delete every frame artifact (any extension) and leave the directory present.
    ///
    /// Other files are left alone. Returns the number of files removed.
    pub fn purge(&self) -> ReelResult<usize> {
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("failed to create artifact directory '{}'", self.root.display())
        })?;
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("failed to list '{}'", self.root.display()))?;

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to list '{}'", self.root.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_frame_artifact(name) || !entry.path().is_file() {
                continue;
            }
            std::fs::remove_file(entry.path())
                .with_context(|| format!("failed to remove '{}'", entry.path().display()))?;
            removed += 1;
        }
        tracing::debug!(dir = %self.root.display(), removed, "purged frame artifacts");
        Ok(removed)
    }
}

pub(crate) fn validate_ext(ext: &str) -> ReelResult<()> {
    if ext.is_empty() || ext.contains(['.', '/', '\\']) {
        return Err(ReelError::validation(format!(
            "artifact extension '{ext}' must be a bare, non-empty extension"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/artifacts.rs"]
mod tests;
