//! Object detection configuration

use detection_core::{DistanceConfig, Roi};
use serde::{Deserialize, Serialize};

use crate::ObjectDetectorError;

/// Object detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDetectionConfig {
    /// Frontal zone a detection's center must fall in
    pub roi: Roi,

    /// Minimum detector score
    pub min_confidence: f32,

    /// Objects estimated farther than this (meters) are ignored
    pub max_distance: f32,

    /// Minimum box area as a fraction of the frame
    pub min_object_size: f32,

    /// Class allowlist
    pub priority_objects: Vec<String>,

    /// Distance estimation parameters
    pub distance: DistanceConfig,

    /// ONNX model path
    pub model_path: Option<String>,

    /// Square model input side (pixels)
    pub input_size: u32,
}

impl Default for ObjectDetectionConfig {
    fn default() -> Self {
        let priority_objects = [
            // People and vehicles
            "person", "car", "truck", "bus", "motorcycle", "bicycle",
            // Urban obstacles
            "chair", "bench", "potted plant", "suitcase", "backpack",
            "handbag", "bottle", "cup", "umbrella",
            // Signs and infrastructure
            "stop sign", "traffic light", "fire hydrant", "parking meter",
            // Animals
            "dog", "cat", "bird", "horse", "sheep", "cow",
            // Other obstacles
            "skateboard", "sports ball", "kite", "frisbee",
            "couch", "bed", "dining table", "tv", "laptop",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            roi: Roi::default(),
            min_confidence: 0.45,
            max_distance: 3.0,
            min_object_size: 0.025,
            priority_objects,
            distance: DistanceConfig::default(),
            model_path: None,
            input_size: 300,
        }
    }
}

impl ObjectDetectionConfig {
    pub fn validate(&self) -> Result<(), ObjectDetectorError> {
        self.roi.validate()?;
        Ok(())
    }

    pub fn is_priority_class(&self, class_name: &str) -> bool {
        self.priority_objects.iter().any(|c| c == class_name)
    }
}
