//! Obstacle Navigator
//!
//! Drives the detection loop for a walking user:
//! - Pulls frames from a [`camera_capture::FrameSource`] at a throttled rate
//! - Runs known-object detection every cycle, level changes on a reduced cadence
//! - Fuses and ranks the results, then schedules speech and vibration

pub mod settings;
pub mod pipeline;

pub use settings::{NavigatorConfig, PipelineConfig};
pub use pipeline::{CycleReport, DetectionSession, SessionSummary, StopHandle};

use alerting::AlertError;
use camera_capture::CameraError;
use detection_core::GeometryError;
use object_detection::ObjectDetectorError;
use scene_heuristics::HeuristicsError;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Navigator error types
#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Object detection error: {0}")]
    Detector(#[from] ObjectDetectorError),

    #[error("Scene heuristics error: {0}")]
    Heuristics(#[from] HeuristicsError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),
}

impl From<::config::ConfigError> for NavigatorError {
    fn from(e: ::config::ConfigError) -> Self {
        NavigatorError::Config(e.to_string())
    }
}

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Tracing subscriber already installed");
    }
}
