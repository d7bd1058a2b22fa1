use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use ndarray::ArrayView2;
use tch::{CModule, Device, IValue, Kind, Tensor};

use super::{InferenceError, ModelLoadError, first_tensor, preprocess};
use crate::config::DetectorConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl BoundingBox {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let iy = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Proposes leaf regions. Boxes come back in the detector's own order and
/// callers must not assume anything beyond that.
pub trait LeafDetector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<BoundingBox>, InferenceError>;
}

/// YOLO-family detector exported to TorchScript.
pub struct TorchDetector {
    model: Mutex<CModule>,
    device: Device,
    settings: DetectorConfig,
}

impl TorchDetector {
    pub fn load(
        path: &Path,
        device: Device,
        settings: DetectorConfig,
    ) -> Result<Self, ModelLoadError> {
        let mut model = CModule::load_on_device(path, device)?;
        model.set_eval();
        Ok(Self {
            model: Mutex::new(model),
            device,
            settings,
        })
    }
}

impl LeafDetector for TorchDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<BoundingBox>, InferenceError> {
        let size = self.settings.input_size as i64;
        let (data, letterbox) = preprocess::letterbox(image, self.settings.input_size);
        let input = Tensor::from_slice(&data)
            .view([1, 3, size, size])
            .to_device(self.device);

        let output = {
            let model = self.model.lock().map_err(|_| InferenceError::LockPoisoned)?;
            tch::no_grad(|| model.forward_is(&[IValue::Tensor(input)]))?
        };
        let predictions = first_tensor(output)?
            .to_device(Device::Cpu)
            .to_kind(Kind::Float);

        let shape = predictions.size();
        let (rows, cols) = match shape.as_slice() {
            [1, rows, cols] => (*rows as usize, *cols as usize),
            _ => {
                return Err(InferenceError::UnexpectedOutput(format!(
                    "detector output shape {:?}, expected [1, 4 + classes, anchors]",
                    shape
                )));
            }
        };
        let flat = Vec::<f32>::try_from(predictions.contiguous().view([-1]))?;
        let raw = ArrayView2::from_shape((rows, cols), flat.as_slice())
            .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?;

        let (width, height) = image.dimensions();
        let boxes = decode_predictions(raw, &self.settings)?
            .into_iter()
            .map(|b| letterbox.restore(b, width, height))
            .collect::<Vec<_>>();
        log::debug!("Detector proposed {} box(es)", boxes.len());
        Ok(boxes)
    }
}

/// Decodes a `[4 + classes, anchors]` prediction matrix whose first four rows
/// are `cx, cy, w, h`. Returns surviving boxes sorted by descending confidence.
pub fn decode_predictions(
    raw: ArrayView2<f32>,
    settings: &DetectorConfig,
) -> Result<Vec<BoundingBox>, InferenceError> {
    let (rows, anchors) = raw.dim();
    if rows < 5 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "detector output has {} rows, expected at least 5",
            rows
        )));
    }

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let column = raw.column(anchor);
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (idx, &score)| {
                if score > best.1 { (idx, score) } else { best }
            });
        if confidence <= settings.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        candidates.push(BoundingBox {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence,
            class_id,
        });
    }

    Ok(non_max_suppression(
        candidates,
        settings.iou_threshold,
        settings.max_detections,
    ))
}

/// Class-aware NMS. Output is ordered by descending confidence.
pub fn non_max_suppression(
    mut boxes: Vec<BoundingBox>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<BoundingBox> = Vec::new();
    for candidate in boxes {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
