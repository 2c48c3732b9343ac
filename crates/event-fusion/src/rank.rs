//! Ranking

use detection_core::Detection;
use tracing::debug;

/// Maximum length of the fused list
pub const MAX_FUSED: usize = 5;

/// Stable sort by `(priority rank, distance)` and truncate to [`MAX_FUSED`].
///
/// Equal keys keep their input order.
pub fn rank(mut detections: Vec<Detection>) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.distance.total_cmp(&b.distance))
    });
    detections.truncate(MAX_FUSED);
    detections
}

/// Concatenate Layer 1 ahead of Layer 2 and rank the result
pub fn fuse(layer1: Vec<Detection>, layer2: Vec<Detection>) -> Vec<Detection> {
    let total = layer1.len() + layer2.len();
    let mut all = layer1;
    all.extend(layer2);

    let fused = rank(all);
    if total > 0 {
        debug!("Fused {} detections into {}", total, fused.len());
    }
    fused
}
