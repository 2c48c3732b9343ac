//! Layer 2 and Layer 3 outputs as fused detections

use detection_core::{detection_priority, Detection, DetectionType, DistanceEstimator, Position};
use scene_heuristics::{GenericObstacle, LevelChangeDetection, LevelChangeType};

/// Spoken label for unclassified obstacles
pub const OBSTACLE_LABEL: &str = "Obstáculo";

/// Turns heuristic results into [`Detection`] records
#[derive(Debug, Clone)]
pub struct LayerConverter {
    estimator: DistanceEstimator,
    min_level_confidence: f32,
    overlap_threshold: f32,
}

impl LayerConverter {
    pub fn new(estimator: DistanceEstimator, min_level_confidence: f32, overlap_threshold: f32) -> Self {
        Self {
            estimator,
            min_level_confidence,
            overlap_threshold,
        }
    }

    /// Level changes at or above the confidence floor, centered, with a
    /// distance taken from the stripe's vertical position
    pub fn level_changes(&self, level_changes: &[LevelChangeDetection], frame_height: u32) -> Vec<Detection> {
        level_changes
            .iter()
            .filter(|lc| lc.confidence >= self.min_level_confidence)
            .map(|lc| {
                let kind = level_change_kind(lc.kind);
                let distance = self.estimator.from_vertical_position(lc.y as f32, frame_height);
                Detection {
                    kind,
                    label: lc.label.clone(),
                    distance,
                    position: Position::Center,
                    position_x: 0.5,
                    priority: detection_priority(kind, None, distance),
                    confidence: lc.confidence,
                    bounding_box: None,
                }
            })
            .collect()
    }

    /// Generic obstacles not already explained by a Layer 1 box.
    ///
    /// Distance comes from the region's bottom edge, where it meets the ground.
    pub fn obstacles(
        &self,
        obstacles: &[GenericObstacle],
        known: &[Detection],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection> {
        if frame_width == 0 || frame_height == 0 {
            return Vec::new();
        }

        let known_boxes: Vec<_> = known.iter().filter_map(|d| d.bounding_box).collect();

        obstacles
            .iter()
            .filter(|obstacle| obstacle.max_overlap(&known_boxes) <= self.overlap_threshold)
            .map(|obstacle| {
                let bbox = obstacle.bbox;
                let distance = self.estimator.from_vertical_position(bbox.y + bbox.height, frame_height);
                let (center_x, _) = bbox.center();
                let position_x = (center_x / frame_width as f32).clamp(0.0, 1.0);
                Detection {
                    kind: DetectionType::Obstacle,
                    label: OBSTACLE_LABEL.to_string(),
                    distance,
                    position: Position::from_normalized_x(position_x),
                    position_x,
                    priority: detection_priority(DetectionType::Obstacle, None, distance),
                    confidence: obstacle.confidence,
                    bounding_box: Some(bbox),
                }
            })
            .collect()
    }
}

impl Default for LayerConverter {
    fn default() -> Self {
        Self::new(DistanceEstimator::default(), 0.5, 0.5)
    }
}

fn level_change_kind(kind: LevelChangeType) -> DetectionType {
    match kind {
        LevelChangeType::StairDown => DetectionType::StairDown,
        LevelChangeType::StairUp => DetectionType::StairUp,
        LevelChangeType::Curb => DetectionType::Curb,
        LevelChangeType::Fence => DetectionType::Fence,
    }
}
