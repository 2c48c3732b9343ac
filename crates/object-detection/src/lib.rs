//! Known-Object Detection (Layer 1)
//!
//! Wraps a pretrained object localiser and turns its raw predictions into
//! annotated hazards:
//! - Priority-class allowlist and confidence gate
//! - Region-of-interest and minimum-size filtering
//! - Distance from apparent height, lateral position, priority tier
//!
//! The model itself is an injected capability ([`ModelLoader`] /
//! [`ObjectModel`]); an ONNX SSD backend is provided in [`onnx`].

pub mod config;
pub mod detector;
pub mod model;
pub mod onnx;

pub use config::ObjectDetectionConfig;
pub use detector::{KnownObjectDetector, ModelStatus};
pub use model::{FnModel, ModelLoader, ObjectModel, RawPrediction, ReadyLoader};
pub use onnx::{OnnxSsdLoader, OnnxSsdModel};

use detection_core::GeometryError;
use thiserror::Error;

/// Object detection error types
#[derive(Error, Debug)]
pub enum ObjectDetectorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model unavailable")]
    ModelUnavailable,

    #[error("Invalid frame format")]
    InvalidFrame,

    #[error("Configuration error: {0}")]
    Config(#[from] GeometryError),
}
