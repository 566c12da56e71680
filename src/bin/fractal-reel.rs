use std::io::{BufRead as _, IsTerminal as _, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fractal_reel::{
    AnimationDescriptor, FrameSequence, ImageMagickConverter, PipelineConfig, PipelineDriver,
    PurgePolicy, RenderSettings, ReelError, ToolRole, locate_renderer, parse_center,
    parse_resolution,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fractal-reel", version, about = "Render fractal zoom/scan animations to MP4")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame and encode the video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the frame jobs as JSON without running any external tool.
    Plan(AnimationArgs),
    /// Delete temporary frame files and exit.
    Clean(ConfigArgs),
}

#[derive(Args, Debug)]
struct AnimationArgs {
    /// Animation type.
    #[arg(long = "type", value_enum, default_value_t = AnimationKind::Zoom)]
    kind: AnimationKind,

    /// Total frames.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Resolution as WIDTHxHEIGHT.
    #[arg(long, default_value = "800x600")]
    resolution: String,

    /// Iteration cap passed to the renderer.
    #[arg(long, default_value_t = 1000)]
    max_iter: u32,

    /// Zoom center as x,y (zoom only).
    #[arg(long, default_value = "-0.7269,0.1889", allow_hyphen_values = true)]
    center: String,

    /// Starting magnification (zoom only).
    #[arg(long, default_value_t = 1.0)]
    start_zoom: f64,

    /// Final magnification (zoom only).
    #[arg(long, default_value_t = 1000.0)]
    end_zoom: f64,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON pipeline config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory (holds the video and the temp frame directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    anim: AnimationArgs,

    #[command(flatten)]
    cfg: ConfigArgs,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Output video file name, relative to the output directory.
    #[arg(long, default_value = "mandelbrot_animation.mp4")]
    output: PathBuf,

    /// Renderer executable. Defaults to the first existing build/mandelbrot_cpu candidate.
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Render frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Also convert each frame to PNG with ImageMagick `convert`.
    #[arg(long)]
    png_previews: bool,

    /// What to do with frame files after a successful run.
    #[arg(long, value_enum)]
    purge: Option<PurgeChoice>,

    /// Delete leftover frame files before rendering.
    #[arg(long)]
    purge_before: bool,

    /// Only delete temporary frame files, then exit.
    #[arg(long)]
    clean: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AnimationKind {
    Zoom,
    Scan,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PurgeChoice {
    Keep,
    Purge,
    Ask,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Clean(args) => cmd_clean(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<PipelineConfig> {
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    Ok(cfg)
}

fn animation_inputs(args: &AnimationArgs) -> anyhow::Result<(AnimationDescriptor, RenderSettings)> {
    let (width, height) = parse_resolution(&args.resolution)?;
    let settings = RenderSettings::new(width, height, args.max_iter)?;
    let descriptor = match args.kind {
        AnimationKind::Zoom => AnimationDescriptor::zoom(
            parse_center(&args.center)?,
            args.start_zoom,
            args.end_zoom,
            args.frames,
        ),
        AnimationKind::Scan => AnimationDescriptor::scan(args.frames),
    };
    descriptor.validate()?;
    Ok((descriptor, settings))
}

fn cmd_plan(args: AnimationArgs) -> anyhow::Result<()> {
    let (descriptor, settings) = animation_inputs(&args)?;
    let seq = FrameSequence::new(&descriptor, settings)?;
    if seq.dropped_frames() > 0 {
        eprintln!(
            "note: {} of {} requested frames dropped (scan frames split evenly across regions)",
            seq.dropped_frames(),
            descriptor.requested_frames()
        );
    }

    let jobs: Vec<_> = seq.iter().collect();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &jobs).context("write plan JSON")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_clean(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    purge_dir(&cfg)
}

fn purge_dir(cfg: &PipelineConfig) -> anyhow::Result<()> {
    let dir = fractal_reel::ArtifactDir::create(cfg.temp_dir(), cfg.artifact_ext.clone())?;
    let removed = dir.purge()?;
    eprintln!("removed {removed} frame file(s) from {}", dir.path().display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.cfg)?;
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    if args.png_previews {
        cfg.png_previews = true;
    }
    if args.purge_before {
        cfg.purge_before_run = true;
    }
    if let Some(choice) = args.purge {
        cfg.purge_after_success = match choice {
            PurgeChoice::Keep => PurgePolicy::Keep,
            PurgeChoice::Purge => PurgePolicy::Purge,
            PurgeChoice::Ask => PurgePolicy::Ask,
        };
    }
    cfg.validate()?;

    if args.clean {
        return purge_dir(&cfg);
    }

    let (descriptor, settings) = animation_inputs(&args.anim)?;

    let executable = locate_renderer(args.executable.as_deref());
    let renderer = cfg
        .process_renderer(&executable)
        .context("build the renderer first (e.g. `cmake -B build && cmake --build build`)")?;
    let encoder = cfg.ffmpeg_encoder();
    if !encoder.is_available() {
        return Err(ReelError::MissingTool {
            role: ToolRole::Encoder,
            program: encoder.program().display().to_string(),
        })
        .context("install ffmpeg (e.g. `apt install ffmpeg`)");
    }

    let mut driver = PipelineDriver::new(cfg, Box::new(renderer), Box::new(encoder))?;
    if driver.config().png_previews {
        driver = driver.with_converter(Box::new(ImageMagickConverter::new()));
    }

    let cancel = driver.cancel_token();
    ctrlc::set_handler(move || cancel.cancel()).context("install Ctrl-C handler")?;

    eprintln!("animation:  {}", descriptor.kind());
    eprintln!("renderer:   {}", executable.display());
    eprintln!("resolution: {}x{}", settings.width, settings.height);
    eprintln!("frames:     {}", descriptor.requested_frames());
    eprintln!("max iter:   {}", settings.max_iter);

    let outcome = driver.run(&descriptor, settings, &args.output);
    for w in &outcome.warnings {
        eprintln!("warning: {w}");
    }

    if !outcome.success {
        let err = outcome
            .error
            .map(anyhow::Error::new)
            .unwrap_or_else(|| anyhow::anyhow!("run failed"));
        return Err(err.context(format!(
            "animation failed after {:.1}s ({} of {} frames produced)",
            outcome.elapsed_seconds, outcome.frame_count_produced, outcome.frame_count_planned
        )));
    }

    eprintln!("done in {:.1}s", outcome.elapsed_seconds);
    if let Some(per_frame) = outcome.seconds_per_frame() {
        eprintln!("average {per_frame:.2}s per frame");
    }
    if let Some(report) = &outcome.assembly {
        eprintln!(
            "wrote {} ({:.1} MB)",
            report.output.display(),
            report.megabytes()
        );
    }

    if driver.config().purge_after_success == PurgePolicy::Ask && confirm_purge()? {
        let removed = driver.purge()?;
        eprintln!("removed {removed} frame file(s)");
    }
    Ok(())
}

fn confirm_purge() -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    eprint!("delete temporary frame files? (y/N): ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}
