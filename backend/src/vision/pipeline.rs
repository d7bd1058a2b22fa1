use std::borrow::Cow;

use image::RgbImage;

use super::InferenceError;
use super::classifier::DiseaseClassifier;
use super::detector::LeafDetector;
use super::labels::LabelSet;
use super::preprocess;

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub label: String,
    pub confidence: f32,
}

/// Detector, classifier and label set, wired together once at startup.
pub struct DiagnosisPipeline {
    detector: Box<dyn LeafDetector>,
    classifier: Box<dyn DiseaseClassifier>,
    labels: LabelSet,
}

impl DiagnosisPipeline {
    pub fn new(
        detector: Box<dyn LeafDetector>,
        classifier: Box<dyn DiseaseClassifier>,
        labels: LabelSet,
    ) -> Self {
        Self {
            detector,
            classifier,
            labels,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn diagnose(&self, image_bytes: &[u8]) -> Result<Diagnosis, InferenceError> {
        let image = preprocess::decode_rgb(image_bytes)?;
        let crop = self.leaf_region(&image)?;

        let probabilities = self.classifier.classify(&crop)?;
        if probabilities.len() != self.labels.len() {
            return Err(InferenceError::LabelMismatch {
                expected: self.labels.len(),
                got: probabilities.len(),
            });
        }
        let (index, confidence) = top1(&probabilities)
            .ok_or_else(|| InferenceError::UnexpectedOutput("no class scores".to_string()))?;
        let label = self
            .labels
            .get(index)
            .ok_or(InferenceError::LabelMismatch {
                expected: self.labels.len(),
                got: probabilities.len(),
            })?
            .to_string();

        Ok(Diagnosis { label, confidence })
    }

    /// First detector box, or the whole image when nothing was found.
    fn leaf_region<'a>(&self, image: &'a RgbImage) -> Result<Cow<'a, RgbImage>, InferenceError> {
        let boxes = self.detector.detect(image)?;
        match boxes.first() {
            Some(bbox) => {
                log::debug!(
                    "Cropping to ({:.1}, {:.1})-({:.1}, {:.1}), confidence {:.3}",
                    bbox.x1,
                    bbox.y1,
                    bbox.x2,
                    bbox.y2,
                    bbox.confidence
                );
                Ok(Cow::Owned(preprocess::crop_to_box(image, bbox)))
            }
            None => {
                log::debug!("No leaf detected, classifying the full image");
                Ok(Cow::Borrowed(image))
            }
        }
    }
}

/// Arg-max and its value. Ties resolve to the lowest index.
pub fn top1(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, p)| match best {
            Some((_, best_p)) if p <= best_p => best,
            _ => Some((idx, p)),
        })
}
