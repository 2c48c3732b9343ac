//! Known-object detector

use std::sync::Arc;

use camera_capture::VideoFrame;
use detection_core::{
    detection_priority, is_in_roi, is_significant, translate_object_name, Detection, DetectionType,
    DistanceEstimator, Position,
};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::model::{ModelLoader, ObjectModel, RawPrediction};
use crate::{ObjectDetectionConfig, ObjectDetectorError};

type LoadResult = Result<Arc<dyn ObjectModel>, ObjectDetectorError>;

enum ModelState {
    Loading(oneshot::Receiver<LoadResult>),
    Ready(Arc<dyn ObjectModel>),
    Unavailable,
}

/// Model availability as seen by the detection loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    Unavailable,
}

/// Layer 1: learned detector restricted to priority classes
pub struct KnownObjectDetector {
    config: ObjectDetectionConfig,
    estimator: DistanceEstimator,
    model: ModelState,
}

impl KnownObjectDetector {
    /// Create a detector with no model attached
    pub fn new(config: ObjectDetectionConfig) -> Result<Self, ObjectDetectorError> {
        config.validate()?;
        Ok(Self {
            estimator: DistanceEstimator::new(config.distance.clone()),
            config,
            model: ModelState::Unavailable,
        })
    }

    /// Create a detector around an already loaded model
    pub fn with_model(config: ObjectDetectionConfig, model: Arc<dyn ObjectModel>) -> Result<Self, ObjectDetectorError> {
        let mut detector = Self::new(config)?;
        detector.model = ModelState::Ready(model);
        Ok(detector)
    }

    /// Begin loading a model in the background. Until it resolves the
    /// detector yields no detections.
    pub fn start_loading(&mut self, loader: Arc<dyn ModelLoader>) {
        let (tx, rx) = oneshot::channel();
        info!("Loading object detection model...");
        tokio::spawn(async move {
            let _ = tx.send(loader.load().await);
        });
        self.model = ModelState::Loading(rx);
    }

    /// Resolve a pending load, if it has finished
    pub fn poll_model(&mut self) -> ModelStatus {
        if let ModelState::Loading(rx) = &mut self.model {
            match rx.try_recv() {
                Ok(Ok(model)) => {
                    info!("Object detection model loaded: {}", model.name());
                    self.model = ModelState::Ready(model);
                }
                Ok(Err(e)) => {
                    error!("Failed to load object detection model: {}", e);
                    self.model = ModelState::Unavailable;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    error!("Object detection model loader aborted");
                    self.model = ModelState::Unavailable;
                }
            }
        }
        self.status()
    }

    pub fn status(&self) -> ModelStatus {
        match self.model {
            ModelState::Loading(_) => ModelStatus::Loading,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Unavailable => ModelStatus::Unavailable,
        }
    }

    pub fn config(&self) -> &ObjectDetectionConfig {
        &self.config
    }

    /// Detect known objects in a frame.
    ///
    /// A missing or still-loading model yields an empty list, as does a
    /// frame without real dimensions.
    pub async fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, ObjectDetectorError> {
        self.poll_model();
        let model = match &self.model {
            ModelState::Ready(model) => model.clone(),
            _ => return Ok(Vec::new()),
        };

        if !frame.is_ready() {
            debug!("Frame not ready, skipping object detection");
            return Ok(Vec::new());
        }

        let predictions = model.detect(frame).await?;
        Ok(self.annotate(&predictions, frame.width, frame.height))
    }

    /// Filter raw predictions and annotate the survivors
    pub fn annotate(&self, predictions: &[RawPrediction], frame_width: u32, frame_height: u32) -> Vec<Detection> {
        if frame_width == 0 || frame_height == 0 {
            return Vec::new();
        }

        let config = &self.config;
        predictions
            .iter()
            .filter(|pred| config.is_priority_class(&pred.class) && pred.score >= config.min_confidence)
            .filter(|pred| is_in_roi(&pred.bbox, frame_width, frame_height, &config.roi))
            .filter(|pred| is_significant(&pred.bbox, frame_width, frame_height, config.min_object_size))
            .filter_map(|pred| {
                let distance = self.estimator.from_height(pred.bbox.height, frame_height, &pred.class);
                if distance > config.max_distance {
                    return None;
                }
                let (center_x, _) = pred.bbox.center();
                let position_x = (center_x / frame_width as f32).clamp(0.0, 1.0);

                Some(Detection {
                    kind: DetectionType::KnownObject,
                    label: translate_object_name(&pred.class),
                    distance,
                    position: Position::from_normalized_x(position_x),
                    position_x,
                    priority: detection_priority(DetectionType::KnownObject, Some(&pred.class), distance),
                    confidence: pred.score.clamp(0.0, 1.0),
                    bounding_box: Some(pred.bbox),
                })
            })
            .collect()
    }
}
