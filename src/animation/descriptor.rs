use crate::foundation::error::{ReelError, ReelResult};

/// High-level description of one animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationDescriptor {
    /// Geometric zoom into a fixed center.
    Zoom {
        /// Point the zoom converges on.
        center: (f64, f64),
        /// Magnification of frame 0.
        start_zoom: f64,
        /// Magnification of the last frame.
        end_zoom: f64,
        /// Total frames, at least 2.
        frame_count: u32,
    },
    /// Hold on each catalog region in turn.
    Scan {
        /// Requested frames, at least 1. Only multiples of the catalog size are produced.
        frame_count: u32,
    },
}

impl AnimationDescriptor {
    /// Zoom from `start_zoom` to `end_zoom` around `center`.
    pub fn zoom(center: (f64, f64), start_zoom: f64, end_zoom: f64, frame_count: u32) -> Self {
        Self::Zoom {
            center,
            start_zoom,
            end_zoom,
            frame_count,
        }
    }

    /// Scan the region catalog.
    pub fn scan(frame_count: u32) -> Self {
        Self::Scan { frame_count }
    }

    /// Requested frame count, before any scan remainder is dropped.
    pub fn requested_frames(&self) -> u32 {
        match *self {
            Self::Zoom { frame_count, .. } | Self::Scan { frame_count } => frame_count,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Zoom { .. } => "zoom",
            Self::Scan { .. } => "scan",
        }
    }

    /// Reject descriptors no frame sequence can be built from.
    pub fn validate(&self) -> ReelResult<()> {
        match *self {
            Self::Zoom {
                center,
                start_zoom,
                end_zoom,
                frame_count,
            } => {
                if !center.0.is_finite() || !center.1.is_finite() {
                    return Err(ReelError::validation("zoom center must be finite"));
                }
                for (name, z) in [("start_zoom", start_zoom), ("end_zoom", end_zoom)] {
                    if !(z.is_finite() && z > 0.0) {
                        return Err(ReelError::validation(format!(
                            "{name} must be > 0, got {z}"
                        )));
                    }
                }
                // progress = index / (frame_count - 1)
                if frame_count < 2 {
                    return Err(ReelError::validation(format!(
                        "zoom animation needs at least 2 frames, got {frame_count}"
                    )));
                }
            }
            Self::Scan { frame_count } => {
                if frame_count == 0 {
                    return Err(ReelError::validation(
                        "scan animation needs at least 1 frame",
                    ));
                }
            }
        }
        Ok(())
    }
}
