//! Monocular distance estimation
//!
//! No depth sensor is involved: distance is inferred from how tall an object
//! appears relative to the frame, or for ground-level features from how far
//! down the frame they sit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Distance estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Lower clamp (meters)
    pub min_distance: f32,

    /// Upper clamp (meters)
    pub max_distance: f32,

    /// Fraction of frame height an object of each class fills at 1 meter
    pub reference_heights: HashMap<String, f32>,

    /// Reference height for classes missing from the table
    pub default_reference_height: f32,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        let reference_heights = [
            ("person", 0.7),
            ("car", 0.4),
            ("truck", 0.5),
            ("bus", 0.6),
            ("bicycle", 0.3),
            ("motorcycle", 0.35),
            ("dog", 0.15),
            ("cat", 0.1),
            ("chair", 0.2),
            ("bench", 0.15),
        ]
        .into_iter()
        .map(|(class, h)| (class.to_string(), h))
        .collect();

        Self {
            min_distance: 0.5,
            max_distance: 10.0,
            reference_heights,
            default_reference_height: 0.2,
        }
    }
}

/// Converts apparent size or vertical position into meters
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    config: DistanceConfig,
}

impl DistanceEstimator {
    pub fn new(config: DistanceConfig) -> Self {
        Self { config }
    }

    pub fn min_distance(&self) -> f32 {
        self.config.min_distance
    }

    pub fn max_distance(&self) -> f32 {
        self.config.max_distance
    }

    /// Reference height for a class, falling back to the default entry
    pub fn reference_height(&self, object_class: &str) -> f32 {
        self.config
            .reference_heights
            .get(object_class)
            .copied()
            .unwrap_or(self.config.default_reference_height)
    }

    /// `reference / (bbox_height / frame_height)`, rounded to 0.1 and clamped.
    ///
    /// A zero-height box (or frame) reads as the maximum distance.
    pub fn from_height(&self, bbox_height: f32, frame_height: u32, object_class: &str) -> f32 {
        if frame_height == 0 || !(bbox_height > 0.0) {
            return self.config.max_distance;
        }
        let normalized_height = bbox_height / frame_height as f32;
        let distance = self.reference_height(object_class) / normalized_height;
        self.clamp((distance * 10.0).round() / 10.0)
    }

    /// Coarse bucket for stripe detections; lower in the frame is nearer
    pub fn from_vertical_position(&self, y: f32, frame_height: u32) -> f32 {
        if frame_height == 0 {
            return self.config.max_distance;
        }
        let relative_y = y / frame_height as f32;
        let distance = if relative_y > 0.85 {
            0.5
        } else if relative_y > 0.75 {
            1.0
        } else if relative_y > 0.65 {
            1.5
        } else if relative_y > 0.55 {
            2.0
        } else if relative_y > 0.45 {
            2.5
        } else {
            3.0
        };
        self.clamp(distance)
    }

    fn clamp(&self, distance: f32) -> f32 {
        if distance.is_nan() {
            return self.config.max_distance;
        }
        distance.clamp(self.config.min_distance, self.config.max_distance)
    }
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self::new(DistanceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_person_distance() {
        let estimator = DistanceEstimator::default();
        // Person filling 35% of the frame: 0.7 / 0.35 = 2.0 m
        assert_eq!(estimator.from_height(168.0, 480, "person"), 2.0);
    }

    #[test]
    fn test_unknown_class_uses_default() {
        let estimator = DistanceEstimator::default();
        assert_eq!(estimator.reference_height("umbrella"), 0.2);
        assert_eq!(estimator.from_height(96.0, 480, "umbrella"), 1.0);
    }

    #[test]
    fn test_zero_height_is_max_distance() {
        let estimator = DistanceEstimator::default();
        assert_eq!(estimator.from_height(0.0, 480, "person"), 10.0);
        assert_eq!(estimator.from_height(50.0, 0, "person"), 10.0);
    }

    #[test]
    fn test_clamped_to_min() {
        let estimator = DistanceEstimator::default();
        // Box taller than the frame would be 0.35 m unclamped
        assert_eq!(estimator.from_height(960.0, 480, "person"), 0.5);
    }

    #[test]
    fn test_vertical_position_buckets() {
        let estimator = DistanceEstimator::default();
        assert_eq!(estimator.from_vertical_position(450.0, 480), 0.5);
        assert_eq!(estimator.from_vertical_position(370.0, 480), 1.0);
        assert_eq!(estimator.from_vertical_position(320.0, 480), 1.5);
        assert_eq!(estimator.from_vertical_position(270.0, 480), 2.0);
        assert_eq!(estimator.from_vertical_position(220.0, 480), 2.5);
        assert_eq!(estimator.from_vertical_position(100.0, 480), 3.0);
        assert_eq!(estimator.from_vertical_position(100.0, 0), 10.0);
    }

    proptest! {
        #[test]
        fn prop_distance_within_clamp(bbox_height in 0.001f32..5000.0, frame_height in 1u32..4000) {
            let estimator = DistanceEstimator::default();
            let d = estimator.from_height(bbox_height, frame_height, "person");
            prop_assert!(d >= estimator.min_distance() && d <= estimator.max_distance());
        }
    }
}
