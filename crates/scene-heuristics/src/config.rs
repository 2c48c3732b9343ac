//! Heuristic detector configuration

use serde::{Deserialize, Serialize};

use crate::HeuristicsError;

/// Level-change detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDetectionConfig {
    /// Run the stripe analysis at all
    pub enabled: bool,

    /// 0 = least sensitive, 1 = most; 0.7 is the calibrated baseline
    pub sensitivity: f32,

    /// Stripe height (pixels)
    pub stripe_height: u32,

    /// Run on every Nth detection cycle
    pub every_n_cycles: u32,

    /// Detections below this confidence never reach fusion
    pub min_confidence: f32,

    /// Same-type detections closer than this (pixels) are merged
    pub dedup_distance_px: u32,

    /// Maximum detections reported per frame
    pub max_results: usize,
}

impl Default for LevelDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: 0.7,
            stripe_height: 10,
            every_n_cycles: 4,
            min_confidence: 0.5,
            dedup_distance_px: 30,
            max_results: 3,
        }
    }
}

impl LevelDetectionConfig {
    pub fn validate(&self) -> Result<(), HeuristicsError> {
        if !(0.0..=1.0).contains(&self.sensitivity) {
            return Err(HeuristicsError::InvalidSensitivity(self.sensitivity));
        }
        if self.stripe_height < 2 {
            return Err(HeuristicsError::Config("stripe_height must be at least 2".into()));
        }
        if self.every_n_cycles == 0 {
            return Err(HeuristicsError::Config("every_n_cycles must be positive".into()));
        }
        Ok(())
    }

    /// Multiplier applied to stripe-level thresholds; 1.0 at the baseline
    pub fn threshold_scale(&self) -> f32 {
        1.7 - self.sensitivity
    }
}

/// Generic-obstacle detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericObstacleConfig {
    /// Fuse generic obstacles into the ranked list
    pub enabled: bool,

    /// Grid cell side (pixels)
    pub grid_size: u32,

    /// Regions smaller than this fraction of the ROI are dropped
    pub min_area_fraction: f32,

    /// Regions overlapping a known object by more than this are dropped
    pub overlap_threshold: f32,
}

impl Default for GenericObstacleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: 30,
            min_area_fraction: 0.02,
            overlap_threshold: 0.5,
        }
    }
}

impl GenericObstacleConfig {
    pub fn validate(&self) -> Result<(), HeuristicsError> {
        if self.grid_size == 0 {
            return Err(HeuristicsError::Config("grid_size must be positive".into()));
        }
        Ok(())
    }
}
