//! Scene Heuristics
//!
//! Pixel-level analysis that needs no learned model:
//! - Level changes (stairs down/up, curbs, fences) from horizontal stripes
//! - Generic obstacles from Sobel edge density inside the ROI

pub mod config;
pub mod edges;
pub mod level_change;
pub mod obstacle;

pub use config::{GenericObstacleConfig, LevelDetectionConfig};
pub use level_change::{LevelChangeDetection, LevelChangeDetector, LevelChangeType};
pub use obstacle::{detect_generic_obstacles, GenericObstacle};

use thiserror::Error;

/// Heuristics error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeuristicsError {
    #[error("Sensitivity must be within [0, 1], got {0}")]
    InvalidSensitivity(f32),

    #[error("Configuration error: {0}")]
    Config(String),
}
