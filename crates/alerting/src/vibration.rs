//! Vibration patterns (alternating on/off durations in ms)

use detection_core::{Detection, DetectionType};

const STAIR_DOWN: &[u64] = &[200, 100, 200, 100, 200, 100, 200];
const CURB: &[u64] = &[300, 100, 300];
const STAIR_UP: &[u64] = &[150, 100, 150];
const FENCE: &[u64] = &[200];

const OBJECT_VERY_NEAR: &[u64] = &[100, 50, 100, 50, 100];
const OBJECT_NEAR: &[u64] = &[100, 50, 100];
const OBJECT_FAR: &[u64] = &[80];

/// Pattern for a detection; objects get more pulses the closer they are
pub fn vibration_pattern(detection: &Detection) -> &'static [u64] {
    match detection.kind {
        DetectionType::StairDown => STAIR_DOWN,
        DetectionType::Curb => CURB,
        DetectionType::StairUp => STAIR_UP,
        DetectionType::Fence => FENCE,
        DetectionType::KnownObject | DetectionType::Obstacle => {
            if detection.distance < 1.0 {
                OBJECT_VERY_NEAR
            } else if detection.distance < 2.0 {
                OBJECT_NEAR
            } else {
                OBJECT_FAR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detection_core::{Position, Priority};

    fn det(kind: DetectionType, distance: f32) -> Detection {
        Detection {
            kind,
            label: String::new(),
            distance,
            position: Position::Center,
            position_x: 0.5,
            priority: Priority::Medium,
            confidence: 0.8,
            bounding_box: None,
        }
    }

    #[test]
    fn test_level_change_patterns() {
        assert_eq!(vibration_pattern(&det(DetectionType::StairDown, 2.0)).len(), 7);
        assert_eq!(vibration_pattern(&det(DetectionType::Curb, 2.0)), &[300, 100, 300]);
        assert_eq!(vibration_pattern(&det(DetectionType::Fence, 0.5)), &[200]);
    }

    #[test]
    fn test_object_pattern_scales_with_distance() {
        let near = vibration_pattern(&det(DetectionType::KnownObject, 0.8));
        let mid = vibration_pattern(&det(DetectionType::KnownObject, 1.5));
        let far = vibration_pattern(&det(DetectionType::Obstacle, 3.0));
        assert!(near.len() > mid.len());
        assert!(mid.len() > far.len());
    }
}
