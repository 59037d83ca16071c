//! motionwatch - frame-differencing motion detector
//!
//! This binary:
//! 1. Loads configuration (TOML file + env overrides + CLI flags)
//! 2. Opens the frame source (video file or stub:// synthetic scene)
//! 3. Runs the difference pipeline over consecutive frame pairs
//! 4. Presents the rendered views (headless or PNG snapshots)
//! 5. Exits 0 on end of stream or cancel, -1 if the source cannot be
//!    opened, -2 if it holds fewer than two frames

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use motionwatch::{
    CancelFlag, Display, FileConfig, FileSource, HeadlessDisplay, ImageprocOps, LoopState,
    MotionConfig, MotionPipeline, RunSummary, SnapshotDisplay, SourceError, EXIT_OK,
    EXIT_SOURCE_UNAVAILABLE, EXIT_TOO_FEW_FRAMES,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Video file path or stub:// synthetic scene. Overrides the config.
    source: Option<String>,
    /// TOML config file (otherwise MOTIONWATCH_CONFIG, otherwise defaults).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write every Nth rendered view as PNG under this directory.
    #[arg(long, env = "MOTIONWATCH_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,
    /// Target frame rate override.
    #[arg(long)]
    fps: Option<u32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(summary) => {
            log::info!(
                "done: {:?} after {} pair(s), {} blob(s) total",
                summary.state,
                summary.pairs_processed,
                summary.blobs_total
            );
            std::process::exit(EXIT_OK);
        }
        Err(e) => {
            log::error!("{:#}", e);
            let code = match e.downcast_ref::<SourceError>() {
                Some(SourceError::Unavailable) => EXIT_SOURCE_UNAVAILABLE,
                Some(SourceError::TooFewFrames) => EXIT_TOO_FEW_FRAMES,
                None => 1,
            };
            std::process::exit(code);
        }
    }
}

fn run(args: Args) -> Result<RunSummary> {
    let mut cfg = match &args.config {
        Some(path) => MotionConfig::load_from(path)?,
        None => MotionConfig::load()?,
    };
    if let Some(source) = args.source {
        cfg.source.path = source;
    }
    if let Some(fps) = args.fps {
        if fps == 0 {
            return Err(anyhow!("--fps must be at least 1"));
        }
        cfg.source.target_fps = fps;
    }
    if args.snapshot_dir.is_some() {
        cfg.display.snapshot_dir = args.snapshot_dir;
    }

    let cancel = CancelFlag::new();
    cancel.install_ctrlc()?;

    let source = FileSource::open(FileConfig {
        path: cfg.source.path.clone(),
        target_fps: cfg.source.target_fps,
    })?;

    let pipeline = MotionPipeline::new(
        ImageprocOps::new(),
        cfg.pipeline.clone(),
        cfg.filter.clone(),
    );

    let display: Box<dyn Display> = match &cfg.display.snapshot_dir {
        Some(dir) => Box::new(SnapshotDisplay::create(
            dir.clone(),
            cfg.display.snapshot_stride,
            cancel.clone(),
        )?),
        None => Box::new(HeadlessDisplay::new(cancel.clone())),
    };

    log::info!(
        "motionwatch running. source={} fps={} backend={}",
        cfg.source.path,
        cfg.source.target_fps,
        pipeline.backend_name()
    );
    log::info!(
        "filter: area>{} aspect=[{}, {}] width>{} height>{} diagonal>{}",
        cfg.filter.min_area,
        cfg.filter.aspect_ratio_min,
        cfg.filter.aspect_ratio_max,
        cfg.filter.min_width,
        cfg.filter.min_height,
        cfg.filter.min_diagonal
    );

    let controller = motionwatch::LoopController::new(source, pipeline, display, cfg.poll_timeout());
    let summary = controller.run()?;

    if summary.state == LoopState::UserExit {
        log::info!("closed on operator request");
    }
    Ok(summary)
}
