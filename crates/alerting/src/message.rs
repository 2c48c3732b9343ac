//! Spoken phrasing

use detection_core::{Detection, DetectionType};

/// Distance as spoken: whole meters without a decimal, otherwise one decimal
pub fn format_distance(distance: f32) -> String {
    let rounded = (distance * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Message for the top detection. Drop-offs get an imperative, rising
/// obstacles a caution, everything else a plain distance report.
pub fn announcement_message(detection: &Detection) -> String {
    let distance = format_distance(detection.distance);
    match detection.kind {
        DetectionType::StairDown => format!("¡Alto! Escalera bajando a {} metros", distance),
        DetectionType::Curb => format!("¡Cuidado! Bordillo a {} metros", distance),
        DetectionType::StairUp => format!("Precaución, escalera subiendo a {} metros", distance),
        DetectionType::Fence => format!("Precaución, reja o baranda a {} metros", distance),
        DetectionType::KnownObject | DetectionType::Obstacle => format!(
            "{} {}, {} metros",
            detection.label,
            detection.position.spoken(),
            distance
        ),
    }
}
