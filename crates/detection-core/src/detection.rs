//! Fused detection record

use serde::{Deserialize, Serialize};

use crate::roi::BoundingBox;

/// What kind of hazard a detection describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionType {
    /// Object recognised by the learned detector
    KnownObject,
    /// Drop-off ahead
    StairDown,
    /// Rising steps ahead
    StairUp,
    /// Kerb edge
    Curb,
    /// Railing or fence
    Fence,
    /// Unclassified edge-dense region
    Obstacle,
}

impl DetectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionType::KnownObject => "known_object",
            DetectionType::StairDown => "stair_down",
            DetectionType::StairUp => "stair_up",
            DetectionType::Curb => "curb",
            DetectionType::Fence => "fence",
            DetectionType::Obstacle => "obstacle",
        }
    }

    /// Level changes come from the stripe heuristic rather than a model
    pub fn is_level_change(&self) -> bool {
        matches!(
            self,
            DetectionType::StairDown | DetectionType::StairUp | DetectionType::Curb | DetectionType::Fence
        )
    }
}

/// Priority tier.
///
/// Ordering follows severity rank: `Critical < High < Medium < Low`, so an
/// ascending sort puts the most urgent detections first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// critical=0, high=1, medium=2, low=3
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Lateral bucket relative to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl Position {
    /// Bucket a normalised horizontal center: `< 0.35` left, `> 0.65` right
    pub fn from_normalized_x(position_x: f32) -> Self {
        if position_x < 0.35 {
            Position::Left
        } else if position_x > 0.65 {
            Position::Right
        } else {
            Position::Center
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Position::Left => "izquierda",
            Position::Center => "centro",
            Position::Right => "derecha",
        }
    }

    /// Phrase used in spoken messages
    pub fn spoken(&self) -> &'static str {
        match self {
            Position::Left => "a tu izquierda",
            Position::Center => "al frente",
            Position::Right => "a tu derecha",
        }
    }
}

/// Unified hazard detection, recomputed from scratch every cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Hazard kind
    #[serde(rename = "type")]
    pub kind: DetectionType,

    /// Localised description
    pub label: String,

    /// Estimated distance (meters), clamped to the estimator range
    pub distance: f32,

    /// Lateral bucket
    pub position: Position,

    /// Normalised horizontal center in [0, 1]
    pub position_x: f32,

    /// Priority tier
    pub priority: Priority,

    /// Detector confidence in [0, 1]
    pub confidence: f32,

    /// Pixel bounding box, known objects only
    pub bounding_box: Option<BoundingBox>,
}

impl Detection {
    pub fn is_critical(&self) -> bool {
        self.priority == Priority::Critical
    }
}
