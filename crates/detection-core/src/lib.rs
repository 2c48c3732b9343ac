//! Detection Core
//!
//! Shared, side-effect-free building blocks for every detection layer:
//! - The fused `Detection` record and its priority tiers
//! - Region-of-interest and significance filters
//! - Monocular distance estimation from apparent size or vertical position
//! - Label translation for spoken output

pub mod detection;
pub mod distance;
pub mod labels;
pub mod priority;
pub mod roi;

pub use detection::{Detection, DetectionType, Position, Priority};
pub use distance::{DistanceConfig, DistanceEstimator};
pub use labels::{coco_class_name, translate_object_name, COCO_CLASSES};
pub use priority::detection_priority;
pub use roi::{is_in_roi, is_significant, overlap_fraction, BoundingBox, Roi};

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid region of interest: {0}")]
    InvalidRoi(String),
}
