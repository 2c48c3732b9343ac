//! Obstacle Navigator - Main Entry Point

use std::path::PathBuf;
use std::sync::Arc;

use alerting::{AlertDispatcher, LogHaptics, LogVoice};
use anyhow::{bail, Context, Result};
use camera_capture::ImageSequenceSource;
use clap::Parser;
use navigator::{init_logging, DetectionSession, NavigatorConfig};
use object_detection::{KnownObjectDetector, OnnxSsdLoader};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "NAVIGATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of PNG/JPEG frames to replay as the camera feed
    #[arg(long)]
    frames: PathBuf,

    /// Playback rate of the frame directory
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// SSD object detector in ONNX format
    #[arg(long)]
    model: Option<PathBuf>,

    /// Replay the frames in a loop until interrupted
    #[arg(long)]
    looping: bool,

    /// Disable speech and vibration
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    if args.fps == 0 {
        bail!("fps must be >= 1");
    }

    info!("=== Obstacle Navigator v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = NavigatorConfig::load(args.config.as_deref()).context("loading configuration")?;
    if args.mute {
        config.pipeline.audio_enabled = false;
    }

    let mut detector = KnownObjectDetector::new(config.object_detection.clone())?;
    let model_path = args
        .model
        .clone()
        .or_else(|| config.object_detection.model_path.as_ref().map(PathBuf::from));
    match model_path {
        Some(path) => {
            detector.start_loading(Arc::new(OnnxSsdLoader::new(path, config.object_detection.input_size)));
        }
        None => warn!("No object detection model configured, running level-change detection only"),
    }

    let mut source = ImageSequenceSource::open(&args.frames, args.fps, args.looping)
        .with_context(|| format!("opening frames in {}", args.frames.display()))?;
    info!("Replaying {} frames at {} fps", source.len(), args.fps);

    let dispatcher = AlertDispatcher::new(Box::new(LogVoice), Box::new(LogHaptics));
    let mut session = DetectionSession::new(&config, detector, dispatcher)?;
    let mut reports = session.subscribe(64);

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            stop.stop();
        }
    });

    tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            match serde_json::to_string(&report) {
                Ok(json) => debug!("Cycle report: {}", json),
                Err(e) => warn!("Failed to encode cycle report: {}", e),
            }
        }
    });

    let summary = session.run(&mut source).await?;
    info!(
        "Done: {} frames, {} cycles, {} announcements, {} failed cycles",
        summary.frames, summary.cycles, summary.announcements, summary.errors
    );

    Ok(())
}
