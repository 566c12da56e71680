//! fractal-reel turns a high-level fractal animation description into a video.
//!
//! The crate does not compute fractals and does not encode video itself. It computes one
//! viewport per frame, drives an external single-frame renderer for each of them, and hands the
//! resulting numbered image sequence to `ffmpeg`.
//!
//! # Pipeline overview
//!
//! 1. **Sequence**: `AnimationDescriptor -> FrameSequence` (ordered, contiguous [`FrameJob`]s)
//! 2. **Render**: `FrameJob -> frame_NNNNNN.ppm` through a [`Renderer`], with a per-frame timeout
//!    and an artifact existence check
//! 3. **Assemble**: `frame_%06d.ppm -> video.mp4` through an [`Encoder`]
//!
//! [`PipelineDriver`] composes the three steps over one [`ArtifactDir`]. The first failed frame
//! ends the run and no video is assembled from an incomplete sequence.
//!
//! External tools sit behind the [`Renderer`], [`Encoder`] and [`Converter`] traits so tests can
//! substitute in-process stubs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod encode;
mod foundation;
mod pipeline;
mod render;
mod sequence;

pub use animation::descriptor::AnimationDescriptor;
pub use animation::regions::{CATALOG, Region, catalog};
pub use animation::viewport::{
    BASE_HEIGHT, BASE_WIDTH, viewport_for_region, viewport_for_zoom, zoom_at,
};
pub use encode::convert::{Converter, ImageMagickConverter};
pub use encode::ffmpeg::{
    AssemblyReport, DEFAULT_ENCODE_TIMEOUT, EncodeProfile, EncodeRequest, Encoder, FfmpegEncoder,
    VideoAssembler, ensure_parent_dir,
};
pub use foundation::artifacts::{
    ArtifactDir, FRAME_INDEX_WIDTH, frame_file_name, is_frame_artifact,
};
pub use foundation::core::{CancelToken, RenderSettings, Viewport, parse_center, parse_resolution};
pub use foundation::error::{ReelError, ReelResult, ToolFailure, ToolRole};
pub use foundation::process::is_on_path;
pub use pipeline::config::{PipelineConfig, PurgePolicy, RenderThreading};
pub use pipeline::driver::{PipelineDriver, PipelineOutcome};
pub use render::frame::{
    DEFAULT_RENDER_TIMEOUT, FrameRenderer, FrameResult, ProcessRenderer, RENDERER_CANDIDATES,
    Renderer, locate_renderer, render_args,
};
pub use sequence::sequencer::{FrameJob, FrameJobs, FrameSequence, expand};
