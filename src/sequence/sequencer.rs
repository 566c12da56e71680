use crate::animation::descriptor::AnimationDescriptor;
use crate::animation::regions::{Region, catalog};
use crate::animation::viewport::{
    BASE_HEIGHT, BASE_WIDTH, centered_unchecked, viewport_for_region, viewport_for_zoom, zoom_at,
};
use crate::foundation::core::{RenderSettings, Viewport};
use crate::foundation::error::{ReelError, ReelResult};

/// One unit of rendering work. `index` fixes the artifact filename and therefore the position of
/// the frame in the encoded video.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameJob {
    /// Zero-based, contiguous frame index.
    pub index: u32,
    /// Region of the plane to render.
    pub viewport: Viewport,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Iteration cap.
    pub max_iter: u32,
}

#[derive(Clone, Debug)]
enum Plan {
    Zoom {
        center: (f64, f64),
        start_zoom: f64,
        end_zoom: f64,
    },
    Scan {
        viewports: Vec<Viewport>,
        per_region: u32,
    },
}

/// The ordered frame jobs of one animation.
///
/// Construction validates everything up front; afterwards every index in `0..len()` maps to a
/// job without further checks. The sequence is lazy and can be iterated any number of times.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    plan: Plan,
    settings: RenderSettings,
    len: u32,
    requested: u32,
}

impl FrameSequence {
    /// Expand `descriptor` for frames of the given raster `settings`.
    pub fn new(descriptor: &AnimationDescriptor, settings: RenderSettings) -> ReelResult<Self> {
        descriptor.validate()?;
        settings.validate()?;

        let requested = descriptor.requested_frames();
        let (plan, len) = match *descriptor {
            AnimationDescriptor::Zoom {
                center,
                start_zoom,
                end_zoom,
                frame_count,
            } => {
                // Interior magnifications lie between the endpoints, so two valid endpoint
                // viewports imply valid viewports for every frame.
                for progress in [0.0, 1.0] {
                    viewport_for_zoom(
                        BASE_WIDTH,
                        BASE_HEIGHT,
                        center,
                        progress,
                        start_zoom,
                        end_zoom,
                    )
                    .map_err(|e| {
                        ReelError::validation(format!("zoom range not representable: {e}"))
                    })?;
                }
                (
                    Plan::Zoom {
                        center,
                        start_zoom,
                        end_zoom,
                    },
                    frame_count,
                )
            }
            AnimationDescriptor::Scan { frame_count } => {
                let regions = catalog();
                let viewports = regions
                    .iter()
                    .map(|r| viewport_for_region(BASE_WIDTH, BASE_HEIGHT, r))
                    .collect::<ReelResult<Vec<_>>>()?;
                // Remainder frames are dropped, not appended to the last region.
                let per_region = frame_count / regions.len() as u32;
                let len = per_region * regions.len() as u32;
                (
                    Plan::Scan {
                        viewports,
                        per_region,
                    },
                    len,
                )
            }
        };

        Ok(Self {
            plan,
            settings,
            len,
            requested,
        })
    }

    /// Number of jobs that will be produced.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no job will be produced (a scan shorter than the catalog).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Requested frames minus produced frames.
    pub fn dropped_frames(&self) -> u32 {
        self.requested - self.len
    }

    /// Raster settings shared by every job.
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Job for `index`, or `None` past the end.
    pub fn job(&self, index: u32) -> Option<FrameJob> {
        if index >= self.len {
            return None;
        }
        let viewport = match &self.plan {
            Plan::Zoom {
                center,
                start_zoom,
                end_zoom,
            } => {
                let progress = f64::from(index) / f64::from(self.len - 1);
                centered_unchecked(
                    BASE_WIDTH,
                    BASE_HEIGHT,
                    *center,
                    zoom_at(progress, *start_zoom, *end_zoom),
                )
            }
            Plan::Scan {
                viewports,
                per_region,
            } => viewports[(index / per_region) as usize],
        };
        Some(FrameJob {
            index,
            viewport,
            width: self.settings.width,
            height: self.settings.height,
            max_iter: self.settings.max_iter,
        })
    }

    /// Catalog region a scan frame belongs to; `None` for zoom sequences.
    pub fn region_of(&self, index: u32) -> Option<&'static Region> {
        match &self.plan {
            Plan::Scan { per_region, .. } if index < self.len => {
                catalog().get((index / per_region) as usize)
            }
            _ => None,
        }
    }

    /// Iterate jobs in index order.
    pub fn iter(&self) -> FrameJobs<'_> {
        FrameJobs {
            seq: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = FrameJob;
    type IntoIter = FrameJobs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the jobs of a [`FrameSequence`].
#[derive(Clone, Debug)]
pub struct FrameJobs<'a> {
    seq: &'a FrameSequence,
    next: u32,
}

impl Iterator for FrameJobs<'_> {
    type Item = FrameJob;

    fn next(&mut self) -> Option<FrameJob> {
        let job = self.seq.job(self.next)?;
        self.next += 1;
        Some(job)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.seq.len.saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for FrameJobs<'_> {}

/// Expand a descriptor into an owned job list.
pub fn expand(
    descriptor: &AnimationDescriptor,
    settings: RenderSettings,
) -> ReelResult<Vec<FrameJob>> {
    Ok(FrameSequence::new(descriptor, settings)?.iter().collect())
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
