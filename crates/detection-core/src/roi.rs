//! Region-of-interest geometry
//!
//! All checks are pure. Zero-sized frames never pass a filter.

use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Pixel rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Normalised "in front of the user" rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x_start: f32,
    pub x_end: f32,
    pub y_start: f32,
    pub y_end: f32,
}

impl Default for Roi {
    /// Frontal zone roughly two meters ahead and one meter wide
    fn default() -> Self {
        Self {
            x_start: 0.25,
            x_end: 0.75,
            y_start: 0.30,
            y_end: 0.85,
        }
    }
}

impl Roi {
    pub fn new(x_start: f32, x_end: f32, y_start: f32, y_end: f32) -> Result<Self, GeometryError> {
        let roi = Self {
            x_start,
            x_end,
            y_start,
            y_end,
        };
        roi.validate()?;
        Ok(roi)
    }

    /// Bounds in [0, 1] with `start < end` on both axes
    pub fn validate(&self) -> Result<(), GeometryError> {
        let bounds = [self.x_start, self.x_end, self.y_start, self.y_end];
        if bounds.iter().any(|b| !(0.0..=1.0).contains(b)) {
            return Err(GeometryError::InvalidRoi(format!("bounds outside [0, 1]: {:?}", self)));
        }
        if self.x_start >= self.x_end || self.y_start >= self.y_end {
            return Err(GeometryError::InvalidRoi(format!("empty rectangle: {:?}", self)));
        }
        Ok(())
    }

    /// Inclusive containment of a normalised point
    pub fn contains(&self, nx: f32, ny: f32) -> bool {
        nx >= self.x_start && nx <= self.x_end && ny >= self.y_start && ny <= self.y_end
    }

    /// Pixel rectangle `(x, y, width, height)` for a frame of the given size
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> (u32, u32, u32, u32) {
        let x = (self.x_start * frame_width as f32).floor() as u32;
        let y = (self.y_start * frame_height as f32).floor() as u32;
        let w = ((self.x_end - self.x_start) * frame_width as f32).floor() as u32;
        let h = ((self.y_end - self.y_start) * frame_height as f32).floor() as u32;
        (x, y, w.min(frame_width - x.min(frame_width)), h.min(frame_height - y.min(frame_height)))
    }
}

/// True iff the box center lies inside the ROI (edges inclusive)
pub fn is_in_roi(bbox: &BoundingBox, frame_width: u32, frame_height: u32, roi: &Roi) -> bool {
    if frame_width == 0 || frame_height == 0 {
        return false;
    }
    let (cx, cy) = bbox.center();
    roi.contains(cx / frame_width as f32, cy / frame_height as f32)
}

/// True iff the box covers at least `min_area_fraction` of the frame
pub fn is_significant(bbox: &BoundingBox, frame_width: u32, frame_height: u32, min_area_fraction: f32) -> bool {
    if frame_width == 0 || frame_height == 0 {
        return false;
    }
    let frame_area = frame_width as f32 * frame_height as f32;
    bbox.area() / frame_area >= min_area_fraction
}

/// Fraction of `region` covered by `other`, in [0, 1]
pub fn overlap_fraction(region: &BoundingBox, other: &BoundingBox) -> f32 {
    let region_area = region.area();
    if region_area <= 0.0 {
        return 0.0;
    }
    let x_overlap = ((region.x + region.width).min(other.x + other.width) - region.x.max(other.x)).max(0.0);
    let y_overlap = ((region.y + region.height).min(other.y + other.height) - region.y.max(other.y)).max(0.0);
    (x_overlap * y_overlap / region_area).clamp(0.0, 1.0)
}
