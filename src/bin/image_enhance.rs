use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use image_enhance::{BatchOptions, ExecutionMode, Executor, ImageCodec, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "image-enhance", version)]
struct Cli {
    /// Log per-file and per-stage details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enhance every image under a directory, mirroring the tree.
    Batch(BatchArgs),
    /// Enhance a single image.
    Enhance(EnhanceArgs),
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Input directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; created if missing.
    #[arg(long)]
    out: PathBuf,

    /// Comma separated stages, e.g. `grayscale,blur,sharpen,equalize`.
    #[arg(long)]
    stages: Option<String>,

    /// Process pixels on the calling thread only.
    #[arg(long)]
    sequential: bool,

    /// Size of the dedicated worker pool.
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,

    /// Encoder quality (0-100).
    #[arg(long, default_value_t = 100)]
    quality: u8,

    /// Log progress every N processed images.
    #[arg(long, default_value_t = image_enhance::batch::DEFAULT_TELEMETRY_INTERVAL)]
    telemetry_interval: usize,
}

#[derive(Parser, Debug)]
struct EnhanceArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image; the extension picks the format.
    #[arg(long)]
    out: PathBuf,

    /// Comma separated stages, e.g. `grayscale,blur,sharpen,equalize`.
    #[arg(long)]
    stages: Option<String>,

    /// Process pixels on the calling thread only.
    #[arg(long)]
    sequential: bool,

    /// Encoder quality (0-100).
    #[arg(long, default_value_t = 100)]
    quality: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Batch(args) => cmd_batch(args),
        Command::Enhance(args) => cmd_enhance(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn parse_pipeline(stages: Option<&str>) -> anyhow::Result<Pipeline> {
    match stages {
        Some(list) => list
            .parse()
            .with_context(|| format!("parse stage list '{list}'")),
        None => Ok(Pipeline::preprocessing()),
    }
}

fn mode(sequential: bool) -> ExecutionMode {
    if sequential {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel
    }
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let pipeline = parse_pipeline(args.stages.as_deref())?;
    let options = BatchOptions {
        mode: mode(args.sequential),
        threads: args.threads,
        quality: args.quality,
        telemetry_interval: args.telemetry_interval,
    };

    let summary = image_enhance::run_batch(&args.in_path, &args.out, &pipeline, &ImageCodec, &options)
        .with_context(|| format!("enhance directory '{}'", args.in_path.display()))?;

    eprintln!(
        "processed {} images ({} failed files, {} failed directories)",
        summary.processed,
        summary.failed_files.len(),
        summary.failed_dirs.len()
    );
    Ok(())
}

fn cmd_enhance(args: EnhanceArgs) -> anyhow::Result<()> {
    let pipeline = parse_pipeline(args.stages.as_deref())?;
    let exec = Executor::for_mode(mode(args.sequential), None)?;

    image_enhance::enhance_file(&ImageCodec, &args.in_path, &args.out, &pipeline, &exec, args.quality)
        .with_context(|| format!("enhance '{}'", args.in_path.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
