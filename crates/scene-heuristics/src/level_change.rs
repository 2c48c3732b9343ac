//! Level-change detection
//!
//! The frame is cut into horizontal stripes. Abrupt brightness jumps between
//! stripes low in the frame read as stairs, dense horizontal edges near the
//! bottom as curbs, and dense edges with repeating vertical discontinuities
//! as fences.

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LevelDetectionConfig;
use crate::HeuristicsError;

/// Pixel delta that counts as an edge between horizontal neighbours
const EDGE_DELTA: f32 = 30.0;
/// Channel-sum delta marking a horizontal edge between stripes
const HORIZONTAL_EDGE_DELTA: u32 = 25;
/// Channel-sum delta marking a vertical discontinuity inside a column
const VERTICAL_EDGE_DELTA: u32 = 30;

const STAIR_STEP_DELTA: f32 = 35.0;
const STAIR_TREND_DELTA: f32 = 30.0;
const CURB_EDGE_DENSITY: f32 = 0.08;
const FENCE_EDGE_DENSITY: f32 = 0.10;

const STAIR_DOWN_MIN_DEPTH: f32 = 0.5;
const STAIR_UP_MIN_DEPTH: f32 = 0.4;
const CURB_MIN_DEPTH: f32 = 0.6;

const FENCE_SAMPLE_COLUMNS: u32 = 10;

/// Level change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelChangeType {
    StairDown,
    StairUp,
    Curb,
    Fence,
}

impl LevelChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            LevelChangeType::StairDown => "Escalera bajando",
            LevelChangeType::StairUp => "Escalera subiendo",
            LevelChangeType::Curb => "Bordillo o andén",
            LevelChangeType::Fence => "Reja o baranda",
        }
    }
}

/// Candidate level change found at stripe row `y`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelChangeDetection {
    #[serde(rename = "type")]
    pub kind: LevelChangeType,
    /// Top row of the stripe (pixels)
    pub y: u32,
    pub confidence: f32,
    pub label: String,
}

impl LevelChangeDetection {
    fn new(kind: LevelChangeType, y: u32, confidence: f32) -> Self {
        Self {
            kind,
            y,
            confidence: confidence.clamp(0.0, 1.0),
            label: kind.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StripeStats {
    brightness: f32,
    edge_density: f32,
}

/// Layer 2 detector. Keeps its stripe buffer between frames.
pub struct LevelChangeDetector {
    config: LevelDetectionConfig,
    brightness_history: Vec<f32>,
}

impl LevelChangeDetector {
    pub fn new(config: LevelDetectionConfig) -> Result<Self, HeuristicsError> {
        config.validate()?;
        Ok(Self {
            config,
            brightness_history: Vec::new(),
        })
    }

    pub fn config(&self) -> &LevelDetectionConfig {
        &self.config
    }

    /// Analyse one frame. Frames without real dimensions yield nothing.
    pub fn detect(&mut self, frame: &VideoFrame) -> Vec<LevelChangeDetection> {
        if !frame.is_ready() {
            return Vec::new();
        }

        let height = frame.height;
        let stripe_height = self.config.stripe_height;
        let num_stripes = height / stripe_height;
        let scale = self.config.threshold_scale();

        let step_delta = STAIR_STEP_DELTA * scale;
        let trend_delta = STAIR_TREND_DELTA * scale;
        let curb_density = CURB_EDGE_DENSITY * scale;
        let fence_density = FENCE_EDGE_DENSITY * scale;

        self.brightness_history.clear();
        let mut detections = Vec::new();
        let mut previous_brightness = 0.0f32;

        for i in 0..num_stripes {
            let y = i * stripe_height;
            let stats = stripe_stats(frame, y, stripe_height);
            let brightness = stats.brightness;
            let depth = y as f32 / height as f32;

            // Needs three stripes of context before a trend means anything
            if i > 2 {
                let trailing = &self.brightness_history[self.brightness_history.len() - 3..];
                let trailing_avg = trailing.iter().sum::<f32>() / 3.0;

                // Dark -> light: drop-off
                if depth > STAIR_DOWN_MIN_DEPTH
                    && brightness > previous_brightness + step_delta
                    && brightness > trailing_avg + trend_delta
                {
                    detections.push(LevelChangeDetection::new(
                        LevelChangeType::StairDown,
                        y,
                        (brightness - previous_brightness) / 80.0,
                    ));
                }

                // Light -> dark: rising steps
                if depth > STAIR_UP_MIN_DEPTH
                    && brightness < previous_brightness - step_delta
                    && brightness < trailing_avg - trend_delta
                {
                    detections.push(LevelChangeDetection::new(
                        LevelChangeType::StairUp,
                        y,
                        (previous_brightness - brightness) / 80.0,
                    ));
                }
            }

            if depth > CURB_MIN_DEPTH
                && stats.edge_density > curb_density
                && y >= stripe_height
                && has_horizontal_edge(frame, y, stripe_height)
            {
                detections.push(LevelChangeDetection::new(
                    LevelChangeType::Curb,
                    y,
                    stats.edge_density * 8.0,
                ));
            }

            if stats.edge_density > fence_density && has_vertical_pattern(frame, y, stripe_height) {
                detections.push(LevelChangeDetection::new(
                    LevelChangeType::Fence,
                    y,
                    stats.edge_density * 6.0,
                ));
            }

            self.brightness_history.push(brightness);
            previous_brightness = brightness;
        }

        let mut filtered = filter_nearby(detections, self.config.dedup_distance_px);
        filtered.truncate(self.config.max_results);

        if !filtered.is_empty() {
            debug!("Level changes: {:?}", filtered.iter().map(|d| (d.kind, d.y)).collect::<Vec<_>>());
        }
        filtered
    }
}

/// Mean brightness and horizontal edge density of one stripe
fn stripe_stats(frame: &VideoFrame, y: u32, stripe_height: u32) -> StripeStats {
    let width = frame.width;
    let mut brightness_sum = 0.0f64;
    let mut edge_count = 0u32;

    for dy in 0..stripe_height {
        let row = y + dy;
        let mut prev = 0.0f32;
        for x in 0..width {
            let brightness = frame.brightness(x, row);
            brightness_sum += brightness as f64;
            if x > 0 && (brightness - prev).abs() > EDGE_DELTA {
                edge_count += 1;
            }
            prev = brightness;
        }
    }

    let pixels = (width * stripe_height) as f32;
    StripeStats {
        brightness: (brightness_sum / pixels as f64) as f32,
        edge_density: edge_count as f32 / pixels,
    }
}

/// Row `y` differs from the row one stripe above across >30% of columns
fn has_horizontal_edge(frame: &VideoFrame, y: u32, stripe_height: u32) -> bool {
    let width = frame.width;
    if width < 3 {
        return false;
    }
    let top = y - stripe_height;
    let edges = (1..width - 1)
        .filter(|&x| frame.channel_sum(x, y).abs_diff(frame.channel_sum(x, top)) > HORIZONTAL_EDGE_DELTA)
        .count();
    edges as f32 > width as f32 * 0.3
}

/// Repetitive vertical structure: more than 40% of sampled columns show
/// brightness discontinuities on more than 30% of the stripe's rows
fn has_vertical_pattern(frame: &VideoFrame, y: u32, stripe_height: u32) -> bool {
    let width = frame.width;
    let mut vertical_lines = 0;

    for i in 0..FENCE_SAMPLE_COLUMNS {
        let x = i * width / FENCE_SAMPLE_COLUMNS;
        let vertical_edges = (0..stripe_height - 1)
            .filter(|&dy| {
                frame.channel_sum(x, y + dy).abs_diff(frame.channel_sum(x, y + dy + 1))
                    > VERTICAL_EDGE_DELTA
            })
            .count();
        if vertical_edges as f32 > stripe_height as f32 * 0.3 {
            vertical_lines += 1;
        }
    }

    vertical_lines as f32 > FENCE_SAMPLE_COLUMNS as f32 * 0.4
}

/// Merge same-type detections closer than `threshold` rows, keeping the
/// more confident one in the earlier slot
fn filter_nearby(detections: Vec<LevelChangeDetection>, threshold: u32) -> Vec<LevelChangeDetection> {
    let mut filtered: Vec<LevelChangeDetection> = Vec::with_capacity(detections.len());

    for current in detections {
        let duplicate = filtered
            .iter_mut()
            .find(|kept| kept.kind == current.kind && kept.y.abs_diff(current.y) < threshold);

        match duplicate {
            Some(kept) => {
                if current.confidence > kept.confidence {
                    *kept = current;
                }
            }
            None => filtered.push(current),
        }
    }

    filtered
}
