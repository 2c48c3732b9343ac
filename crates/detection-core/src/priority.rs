//! Priority assignment

use crate::detection::{DetectionType, Priority};

/// Classes that are dangerous to walk into at any distance
pub const CRITICAL_CLASSES: &[&str] = &["person", "car", "truck", "bus", "motorcycle"];

/// Moving, unpredictable classes
pub const SECONDARY_CLASSES: &[&str] = &["bicycle", "dog", "cat"];

/// Derive the priority tier from `(type, class, distance)`.
///
/// Level changes have fixed tiers; objects follow the distance/class ladder.
pub fn detection_priority(kind: DetectionType, class_name: Option<&str>, distance: f32) -> Priority {
    match kind {
        DetectionType::StairDown | DetectionType::Curb => return Priority::Critical,
        DetectionType::StairUp => return Priority::High,
        DetectionType::Fence => return Priority::Medium,
        DetectionType::KnownObject | DetectionType::Obstacle => {}
    }

    let class_name = class_name.unwrap_or_default();
    let critical_class = CRITICAL_CLASSES.contains(&class_name);

    if distance < 1.0 {
        Priority::Critical
    } else if critical_class && distance < 2.0 {
        Priority::Critical
    } else if critical_class || SECONDARY_CLASSES.contains(&class_name) {
        Priority::High
    } else if distance < 1.5 {
        Priority::High
    } else if distance < 2.5 {
        Priority::Medium
    } else {
        Priority::Low
    }
}
