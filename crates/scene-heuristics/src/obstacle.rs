//! Generic obstacles: edge-dense regions inside the ROI that no learned
//! detector has classified

use camera_capture::VideoFrame;
use detection_core::{overlap_fraction, BoundingBox, Roi};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenericObstacleConfig;
use crate::edges::{edge_regions, sobel_edges};

/// Candidate obstacle in absolute frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenericObstacle {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl GenericObstacle {
    /// Largest fraction of this region covered by any of `boxes`
    pub fn max_overlap<'a>(&self, boxes: impl IntoIterator<Item = &'a BoundingBox>) -> f32 {
        boxes
            .into_iter()
            .map(|other| overlap_fraction(&self.bbox, other))
            .fold(0.0, f32::max)
    }
}

/// Scan the ROI for edge-dense regions.
///
/// Regions smaller than `min_area_fraction` of the ROI are dropped. An ROI
/// that collapses to nothing at this frame size yields an empty list.
pub fn detect_generic_obstacles(
    frame: &VideoFrame,
    roi: &Roi,
    config: &GenericObstacleConfig,
) -> Vec<GenericObstacle> {
    if !frame.is_ready() || config.grid_size == 0 {
        return Vec::new();
    }

    let (roi_x, roi_y, roi_w, roi_h) = roi.to_pixels(frame.width, frame.height);
    if roi_w < 3 || roi_h < 3 {
        return Vec::new();
    }

    let Some(gray) = frame.crop(roi_x, roi_y, roi_w, roi_h).and_then(|crop| crop.to_gray_image()) else {
        return Vec::new();
    };

    let edges = sobel_edges(&gray);
    let min_area = (roi_w * roi_h) as f32 * config.min_area_fraction;

    let obstacles: Vec<GenericObstacle> = edge_regions(&edges, config.grid_size)
        .into_iter()
        .filter(|region| region.area() as f32 >= min_area)
        .map(|region| GenericObstacle {
            bbox: BoundingBox::new(
                (region.x + roi_x) as f32,
                (region.y + roi_y) as f32,
                region.width as f32,
                region.height as f32,
            ),
            confidence: region.confidence,
        })
        .collect();

    if !obstacles.is_empty() {
        debug!("Generic obstacle regions: {}", obstacles.len());
    }
    obstacles
}
