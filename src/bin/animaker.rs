use std::f64::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use animaker::{
    AnimationConfig, Figure, FrameBound, FrameIndex, FrameSource, ImagePattern, PoolSource,
    RenderFn, Rgba8, VideoEncodeOpts,
};

#[derive(Parser, Debug)]
#[command(name = "animaker", version)]
struct Cli {
    /// Log level (`RUST_LOG` takes precedence when set).
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Verbosity::Info, global = true)]
    verbose: Verbosity,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Verbosity {
    Error,
    Warning,
    Info,
    Debug,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the demo animation described by a config file, then encode it (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render a few frames of the demo animation to standalone images.
    Preview(PreviewArgs),
    /// Encode an existing image folder into an MP4 (requires `ffmpeg`).
    Encode(EncodeArgs),
    /// Convert an MP4 into a GIF (requires `ffmpeg`).
    Gif(GifArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Animation config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Delete existing images and render everything again.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Override the number of workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Write per-image statistics as JSON.
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Animation config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Frame indices to render (defaults to the first frame).
    #[arg(long, value_delimiter = ',')]
    indices: Vec<u64>,

    /// Output file name template; `{i}` is replaced by the frame index.
    #[arg(long, default_value = "preview_{i}.png")]
    out: String,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Folder holding `img_<index>.<ext>` images.
    #[arg(long)]
    images: PathBuf,

    /// Number of frames the images were rendered for (sets the index padding).
    #[arg(long)]
    max_frames: u64,

    /// Frames per second.
    #[arg(long)]
    fps: u32,

    /// Image extension.
    #[arg(long, default_value = "png")]
    ext: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Input MP4.
    #[arg(long)]
    video: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// GIF frame rate.
    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// GIF height in pixels.
    #[arg(long, default_value_t = 350)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Gif(args) => cmd_gif(args),
    }
}

fn init_tracing(verbose: Verbosity) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("animaker={}", verbose.directive())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A regular polygon gaining one side per frame, starting at 7 sides.
fn growing_polygon(index: FrameIndex, _: &animaker::Frame) -> Option<Figure> {
    let mut fig = Figure::new(4.0, 4.0, 120.0);
    fig.set_xlim(-1.0, 1.0).set_ylim(-1.0, 1.0);

    let n = index.0 + 7;
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..=n)
        .map(|k| {
            let t = k as f64 / n as f64 * TAU;
            (t.sin(), t.cos())
        })
        .unzip();
    fig.plot(&xs, &ys, 3.0, Rgba8::new(31, 119, 180, 255));
    Some(fig)
}

fn demo_render() -> Arc<RenderFn> {
    Arc::new(growing_polygon)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = AnimationConfig::from_path(&args.config)?;
    config.force |= args.force;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let (work_folder, opts) = config.to_opts()?;
    let source = FrameSource::new(opts.max_frames, None)?;

    let out = animaker::animate(
        &work_folder,
        source,
        demo_render(),
        &opts,
        PoolSource::Auto {
            workers: opts.workers,
        },
    )?;

    if let Some(build) = &out.build {
        for f in &build.failures {
            tracing::warn!(frame = f.index.0, stage = %f.stage, "{}", f.error);
        }
        if let Some(path) = &args.stats_json {
            let records = build.records.records().collect::<Vec<_>>();
            let doc = serde_json::json!({
                "tallies": build.tallies,
                "report": build.stats,
                "records": records,
            });
            let f = std::fs::File::create(path)
                .with_context(|| format!("create stats file '{}'", path.display()))?;
            serde_json::to_writer_pretty(f, &doc)
                .with_context(|| format!("write stats file '{}'", path.display()))?;
        }
    }

    eprintln!("wrote {}", out.video_path.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let config = AnimationConfig::from_path(&args.config)?;
    let (_, opts) = config.to_opts()?;
    let source = FrameSource::new(opts.max_frames, None)?;
    let saved = animaker::preview_frames(
        &source,
        demo_render().as_ref(),
        &args.indices,
        &args.out,
        &opts.save,
    )?;
    for path in saved {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let pattern = ImagePattern::new(
        &args.images,
        FrameBound::from_max_frames(Some(args.max_frames)),
        args.ext,
    );
    let out = animaker::images_to_video(
        &pattern,
        animaker::Fps::integer(args.fps)?,
        &args.out,
        &VideoEncodeOpts::default(),
    )?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_gif(args: GifArgs) -> anyhow::Result<()> {
    let opts = animaker::GifOpts {
        fps: args.fps,
        height: args.height,
    };
    let out = animaker::video_to_gif(&args.video, &args.out, &opts)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
