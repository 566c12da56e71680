use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::animation::descriptor::AnimationDescriptor;
use crate::encode::convert::Converter;
use crate::encode::ffmpeg::{AssemblyReport, Encoder, VideoAssembler};
use crate::foundation::artifacts::ArtifactDir;
use crate::foundation::core::{CancelToken, RenderSettings};
use crate::foundation::error::{ReelError, ReelResult, ToolFailure};
use crate::pipeline::config::{PipelineConfig, PurgePolicy, RenderThreading};
use crate::render::frame::{FrameRenderer, FrameResult, Renderer};
use crate::sequence::sequencer::{FrameJob, FrameSequence};

const PREVIEW_EXT: &str = "png";

/// Terminal result of one run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Video written and every frame produced.
    pub success: bool,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
    /// Where the video was (or would have been) written.
    pub output_path: PathBuf,
    /// Jobs in the sequence.
    pub frame_count_planned: u32,
    /// Requested frames the sequence did not produce (scan remainder).
    pub frame_count_dropped: u32,
    /// Renderer invocations made.
    pub frame_count_attempted: u32,
    /// Frames whose artifact was verified.
    pub frame_count_produced: u32,
    /// Present on success.
    pub assembly: Option<AssemblyReport>,
    /// Present on failure.
    pub error: Option<ReelError>,
    /// Non-fatal conditions, e.g. a missing converter.
    pub warnings: Vec<String>,
    /// Whether artifacts were purged at the end of the run.
    pub artifacts_purged: bool,
}

impl PipelineOutcome {
    fn started(output_path: PathBuf) -> Self {
        Self {
            success: false,
            elapsed_seconds: 0.0,
            output_path,
            frame_count_planned: 0,
            frame_count_dropped: 0,
            frame_count_attempted: 0,
            frame_count_produced: 0,
            assembly: None,
            error: None,
            warnings: Vec::new(),
            artifacts_purged: false,
        }
    }

    /// Average wall-clock seconds per produced frame.
    pub fn seconds_per_frame(&self) -> Option<f64> {
        (self.frame_count_produced > 0)
            .then(|| self.elapsed_seconds / f64::from(self.frame_count_produced))
    }

    /// Collapse into a `Result`.
    pub fn into_result(self) -> ReelResult<AssemblyReport> {
        match (self.error, self.assembly) {
            (Some(e), _) => Err(e),
            (None, Some(report)) => Ok(report),
            (None, None) => Err(ReelError::NoFrames),
        }
    }
}

/// Composes sequencing, per-frame rendering and assembly over one artifact directory.
///
/// Frames are rendered in index order (or on a pool, see [`RenderThreading`]); the first failed
/// frame ends the run and the encoder is then never invoked.
pub struct PipelineDriver {
    config: PipelineConfig,
    artifacts: ArtifactDir,
    renderer: Box<dyn Renderer>,
    encoder: Box<dyn Encoder>,
    converter: Option<Box<dyn Converter>>,
    cancel: CancelToken,
}

impl PipelineDriver {
    /// Validate `config` and create its artifact directory if absent.
    pub fn new(
        config: PipelineConfig,
        renderer: Box<dyn Renderer>,
        encoder: Box<dyn Encoder>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let artifacts = ArtifactDir::create(config.temp_dir(), config.artifact_ext.clone())?;
        Ok(Self {
            config,
            artifacts,
            renderer,
            encoder,
            converter: None,
            cancel: CancelToken::new(),
        })
    }

    /// Converter used when `png_previews` is enabled.
    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Share an externally owned cancellation flag.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels a run in progress.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Artifact directory.
    pub fn artifacts(&self) -> &ArtifactDir {
        &self.artifacts
    }

    /// Remove all frame artifacts; the directory stays. Usable before or after a run.
    pub fn purge(&self) -> ReelResult<usize> {
        self.artifacts.purge()
    }

    /// Run the whole pipeline. Every failure is reported in the outcome, never raised.
    #[tracing::instrument(skip_all, fields(kind = descriptor.kind()))]
    pub fn run(
        &self,
        descriptor: &AnimationDescriptor,
        settings: RenderSettings,
        output: &Path,
    ) -> PipelineOutcome {
        let started = Instant::now();
        let mut outcome = PipelineOutcome::started(self.config.output_path(output));

        match self.run_inner(descriptor, settings, &mut outcome) {
            Ok(report) => {
                outcome.success = true;
                outcome.assembly = Some(report);
                if self.config.purge_after_success == PurgePolicy::Purge {
                    self.purge_into(&mut outcome);
                }
            }
            Err(err) => {
                let err = if self.cancel.is_cancelled() {
                    ReelError::Interrupted
                } else {
                    err
                };
                tracing::error!(error = %err, "run failed");
                if matches!(err, ReelError::Interrupted) {
                    self.purge_into(&mut outcome);
                }
                outcome.error = Some(err);
            }
        }

        outcome.elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            success = outcome.success,
            elapsed_s = outcome.elapsed_seconds,
            produced = outcome.frame_count_produced,
            "run finished"
        );
        outcome
    }

    fn run_inner(
        &self,
        descriptor: &AnimationDescriptor,
        settings: RenderSettings,
        outcome: &mut PipelineOutcome,
    ) -> ReelResult<AssemblyReport> {
        let seq = FrameSequence::new(descriptor, settings)?;
        outcome.frame_count_planned = seq.len();
        outcome.frame_count_dropped = seq.dropped_frames();
        if seq.dropped_frames() > 0 {
            let msg = format!(
                "{} requested frame(s) dropped: scan frames are split evenly across regions",
                seq.dropped_frames()
            );
            tracing::warn!("{msg}");
            outcome.warnings.push(msg);
        }
        if seq.is_empty() {
            return Err(ReelError::NoFrames);
        }

        if self.config.purge_before_run {
            self.artifacts.purge()?;
        }

        tracing::info!(
            frames = seq.len(),
            width = settings.width,
            height = settings.height,
            max_iter = settings.max_iter,
            "rendering frames"
        );
        let frames = FrameRenderer::new(self.renderer.as_ref(), &self.artifacts);
        if self.config.threading.parallel {
            self.render_parallel(&seq, &frames, &self.config.threading, outcome)?;
        } else {
            self.render_sequential(&seq, &frames, outcome)?;
        }
        if self.cancel.is_cancelled() {
            return Err(ReelError::Interrupted);
        }

        if self.config.png_previews {
            self.convert_previews(seq.len(), outcome)?;
        }

        VideoAssembler::new(self.encoder.as_ref()).assemble(
            &self.artifacts,
            seq.len(),
            self.config.fps,
            &outcome.output_path,
            &self.cancel,
        )
    }

    fn render_sequential(
        &self,
        seq: &FrameSequence,
        frames: &FrameRenderer<'_>,
        outcome: &mut PipelineOutcome,
    ) -> ReelResult<()> {
        let mut region = None;
        for job in seq {
            if self.cancel.is_cancelled() {
                return Err(ReelError::Interrupted);
            }
            if let Some(r) = seq.region_of(job.index)
                && region != Some(r.label)
            {
                region = Some(r.label);
                tracing::info!(region = r.label, first_frame = job.index, "entering region");
            }

            outcome.frame_count_attempted += 1;
            let result = frames.render(&job, &self.cancel);
            if !result.ok {
                result.into_result()?;
            }
            outcome.frame_count_produced += 1;
        }
        Ok(())
    }

    fn render_parallel(
        &self,
        seq: &FrameSequence,
        frames: &FrameRenderer<'_>,
        threading: &RenderThreading,
        outcome: &mut PipelineOutcome,
    ) -> ReelResult<()> {
        let pool = build_thread_pool(threading.threads)?;
        let jobs: Vec<FrameJob> = seq.iter().collect();
        let failed = AtomicBool::new(false);

        // Indices are fixed before any work starts; only scheduling order varies.
        let results: Vec<Option<FrameResult>> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    if failed.load(Ordering::SeqCst) || self.cancel.is_cancelled() {
                        return None;
                    }
                    let result = frames.render(job, &self.cancel);
                    if !result.ok {
                        failed.store(true, Ordering::SeqCst);
                    }
                    Some(result)
                })
                .collect()
        });

        outcome.frame_count_attempted = results.iter().flatten().count() as u32;
        outcome.frame_count_produced = results.iter().flatten().filter(|r| r.ok).count() as u32;

        if self.cancel.is_cancelled() {
            return Err(ReelError::Interrupted);
        }
        // Report the lowest failing index so the error matches a sequential run.
        if let Some(first) = results.into_iter().flatten().find(|r| !r.ok) {
            first.into_result()?;
        }
        Ok(())
    }

    /// Conversion failures are warnings; only cancellation ends the run.
    fn convert_previews(
        &self,
        frame_count: u32,
        outcome: &mut PipelineOutcome,
    ) -> ReelResult<()> {
        let Some(converter) = self.converter.as_deref() else {
            let msg = "png previews requested but no converter configured".to_string();
            tracing::warn!("{msg}");
            outcome.warnings.push(msg);
            return Ok(());
        };
        if self.artifacts.ext() == PREVIEW_EXT {
            return Ok(());
        }

        for index in 0..frame_count {
            if self.cancel.is_cancelled() {
                return Err(ReelError::Interrupted);
            }
            let input = self.artifacts.frame_path(index);
            let output = self.artifacts.frame_path_with_ext(index, PREVIEW_EXT);
            match converter.convert(&input, &output, &self.cancel) {
                Ok(()) => {}
                Err(ToolFailure::Interrupted) => return Err(ReelError::Interrupted),
                Err(ToolFailure::NotFound { program }) => {
                    let msg = format!("converter '{program}' not found, skipping png previews");
                    tracing::warn!("{msg}");
                    outcome.warnings.push(msg);
                    return Ok(());
                }
                Err(failure) => {
                    let msg = format!("png preview for frame {index} failed: {failure}");
                    tracing::warn!("{msg}");
                    outcome.warnings.push(msg);
                }
            }
        }
        Ok(())
    }

    fn purge_into(&self, outcome: &mut PipelineOutcome) {
        match self.artifacts.purge() {
            Ok(removed) => {
                tracing::info!(removed, "frame artifacts purged");
                outcome.artifacts_purged = true;
            }
            Err(e) => {
                let msg = format!("failed to purge artifacts: {e}");
                tracing::warn!("{msg}");
                outcome.warnings.push(msg);
            }
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}
