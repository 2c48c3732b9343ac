//! ONNX SSD backend using tract
//!
//! Expects a single-image SSD export:
//! - input `1x3xSxS` float RGB scaled to [0, 1]
//! - output 0: boxes `[1, N, 4]` as normalised `ymin, xmin, ymax, xmax`
//! - output 1: class ids `[1, N]` (0-based COCO-80)
//! - output 2: scores `[1, N]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use camera_capture::VideoFrame;
use detection_core::{coco_class_name, BoundingBox};
use image::imageops::FilterType;
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::model::{ModelLoader, ObjectModel, RawPrediction};
use crate::ObjectDetectorError;

type SsdPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Loads an SSD detector from disk on a blocking thread
pub struct OnnxSsdLoader {
    path: PathBuf,
    input_size: u32,
}

impl OnnxSsdLoader {
    pub fn new(path: impl Into<PathBuf>, input_size: u32) -> Self {
        Self {
            path: path.into(),
            input_size,
        }
    }
}

#[async_trait]
impl ModelLoader for OnnxSsdLoader {
    async fn load(&self) -> Result<Arc<dyn ObjectModel>, ObjectDetectorError> {
        let path = self.path.clone();
        let input_size = self.input_size;
        info!("Loading SSD model from {}", path.display());

        let plan = tokio::task::spawn_blocking(move || load_plan(&path, input_size))
            .await
            .map_err(|e| ObjectDetectorError::ModelLoad(e.to_string()))??;

        Ok(Arc::new(OnnxSsdModel { plan, input_size }))
    }
}

fn load_plan(path: &Path, input_size: u32) -> Result<SsdPlan, ObjectDetectorError> {
    let side = input_size as usize;
    tract_onnx::onnx()
        .model_for_path(path)
        .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, side, side]).into()))
        .and_then(|model| model.into_optimized())
        .and_then(|model| model.into_runnable())
        .map_err(|e| ObjectDetectorError::ModelLoad(format!("{}: {}", path.display(), e)))
}

/// SSD detector running on tract
pub struct OnnxSsdModel {
    plan: SsdPlan,
    input_size: u32,
}

impl OnnxSsdModel {
    fn preprocess(&self, frame: &VideoFrame) -> Result<Tensor, ObjectDetectorError> {
        let img = image::ImageBuffer::<image::Rgb<u8>, _>::from_raw(frame.width, frame.height, &frame.data[..])
            .ok_or(ObjectDetectorError::InvalidFrame)?;

        let side = self.input_size;
        let resized = image::imageops::resize(&img, side, side, FilterType::Triangle);

        let side = side as usize;
        let input = tract_ndarray::Array4::<f32>::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });
        Ok(input.into())
    }
}

#[async_trait]
impl ObjectModel for OnnxSsdModel {
    fn name(&self) -> &str {
        "onnx-ssd"
    }

    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<RawPrediction>, ObjectDetectorError> {
        if !frame.is_ready() {
            return Err(ObjectDetectorError::InvalidFrame);
        }

        let input = self.preprocess(frame)?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ObjectDetectorError::Inference(e.to_string()))?;

        if outputs.len() < 3 {
            return Err(ObjectDetectorError::Inference(format!(
                "expected 3 outputs, got {}",
                outputs.len()
            )));
        }

        let as_f32 = |idx: usize| -> Result<Vec<f32>, ObjectDetectorError> {
            let tensor = outputs[idx]
                .cast_to::<f32>()
                .map_err(|e| ObjectDetectorError::Inference(e.to_string()))?;
            let values = tensor
                .as_slice::<f32>()
                .map_err(|e| ObjectDetectorError::Inference(e.to_string()))?;
            Ok(values.to_vec())
        };

        let boxes = as_f32(0)?;
        let classes = as_f32(1)?;
        let scores = as_f32(2)?;

        let predictions = decode_ssd(&boxes, &classes, &scores, frame.width, frame.height);
        debug!("SSD produced {} predictions", predictions.len());
        Ok(predictions)
    }
}

/// Map flat SSD outputs to frame-pixel predictions
fn decode_ssd(boxes: &[f32], classes: &[f32], scores: &[f32], frame_width: u32, frame_height: u32) -> Vec<RawPrediction> {
    let count = scores.len().min(classes.len()).min(boxes.len() / 4);
    let (w, h) = (frame_width as f32, frame_height as f32);

    (0..count)
        .filter_map(|i| {
            let class = coco_class_name(classes[i].max(0.0) as usize)?;
            let [ymin, xmin, ymax, xmax] = [
                boxes[i * 4].clamp(0.0, 1.0),
                boxes[i * 4 + 1].clamp(0.0, 1.0),
                boxes[i * 4 + 2].clamp(0.0, 1.0),
                boxes[i * 4 + 3].clamp(0.0, 1.0),
            ];
            if xmax <= xmin || ymax <= ymin {
                return None;
            }
            Some(RawPrediction::new(
                class,
                scores[i],
                BoundingBox::new(xmin * w, ymin * h, (xmax - xmin) * w, (ymax - ymin) * h),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ssd() {
        let boxes = [0.25, 0.5, 0.75, 0.75, 0.0, 0.0, 0.0, 0.0];
        let classes = [0.0, 56.0];
        let scores = [0.9, 0.8];
        let preds = decode_ssd(&boxes, &classes, &scores, 640, 480);

        // Degenerate second box dropped
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].class, "person");
        assert_eq!(preds[0].bbox, BoundingBox::new(320.0, 120.0, 160.0, 240.0));
    }

    #[test]
    fn test_decode_unknown_class() {
        let preds = decode_ssd(&[0.0, 0.0, 1.0, 1.0], &[200.0], &[0.9], 10, 10);
        assert!(preds.is_empty());
    }

    #[tokio::test]
    async fn test_missing_model_file() {
        let loader = OnnxSsdLoader::new("/nonexistent/ssd.onnx", 300);
        assert!(matches!(loader.load().await, Err(ObjectDetectorError::ModelLoad(_))));
    }
}
