//! Object detection capability

use std::sync::Arc;

use async_trait::async_trait;
use camera_capture::VideoFrame;
use detection_core::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::ObjectDetectorError;

/// Raw model output, before any filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    /// Class name (COCO vocabulary)
    pub class: String,
    /// Detector score in [0, 1]
    pub score: f32,
    /// Box in frame pixels
    pub bbox: BoundingBox,
}

impl RawPrediction {
    pub fn new(class: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
        Self {
            class: class.into(),
            score,
            bbox,
        }
    }
}

/// A loaded localiser/classifier. Shared read-only across cycles.
#[async_trait]
pub trait ObjectModel: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Predict objects in a frame
    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<RawPrediction>, ObjectDetectorError>;
}

/// Produces a model; may fail, in which case detection runs without Layer 1
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ObjectModel>, ObjectDetectorError>;
}

/// Model backed by a closure, for host integrations and tests
pub struct FnModel<F> {
    name: String,
    predict: F,
}

impl<F> FnModel<F>
where
    F: Fn(&VideoFrame) -> Vec<RawPrediction> + Send + Sync,
{
    pub fn new(name: impl Into<String>, predict: F) -> Self {
        Self {
            name: name.into(),
            predict,
        }
    }
}

#[async_trait]
impl<F> ObjectModel for FnModel<F>
where
    F: Fn(&VideoFrame) -> Vec<RawPrediction> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<RawPrediction>, ObjectDetectorError> {
        Ok((self.predict)(frame))
    }
}

/// Loader that hands out an already constructed model
pub struct ReadyLoader {
    model: Arc<dyn ObjectModel>,
}

impl ReadyLoader {
    pub fn new(model: Arc<dyn ObjectModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ModelLoader for ReadyLoader {
    async fn load(&self) -> Result<Arc<dyn ObjectModel>, ObjectDetectorError> {
        Ok(self.model.clone())
    }
}
