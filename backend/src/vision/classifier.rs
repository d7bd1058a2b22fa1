use std::path::Path;
use std::sync::Mutex;

use image::{Rgb, RgbImage};
use tch::{CModule, Device, IValue, Kind, Tensor};

use super::{InferenceError, ModelLoadError, first_tensor, preprocess};
use crate::config::ClassifierConfig;

/// Scores a leaf crop. Returns one probability per label, summing to 1.
pub trait DiseaseClassifier: Send + Sync {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, InferenceError>;
}

/// Vision-transformer classifier exported to TorchScript.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
    settings: ClassifierConfig,
}

impl TorchClassifier {
    /// Loads the module and runs one warm-up pass to check that its output
    /// width matches `num_classes`.
    pub fn load(
        path: &Path,
        device: Device,
        settings: ClassifierConfig,
        num_classes: usize,
    ) -> Result<Self, ModelLoadError> {
        let mut model = CModule::load_on_device(path, device)?;
        model.set_eval();
        let classifier = Self {
            model: Mutex::new(model),
            device,
            settings,
        };

        let blank = RgbImage::from_pixel(
            classifier.settings.input_size,
            classifier.settings.input_size,
            Rgb([0, 0, 0]),
        );
        let got = classifier.classify(&blank)?.len();
        if got != num_classes {
            return Err(ModelLoadError::WidthMismatch {
                expected: num_classes,
                got,
            });
        }
        Ok(classifier)
    }
}

impl DiseaseClassifier for TorchClassifier {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, InferenceError> {
        let size = self.settings.input_size as i64;
        let data = preprocess::normalize_chw(
            image,
            self.settings.input_size,
            self.settings.mean,
            self.settings.std,
        );
        let input = Tensor::from_slice(&data)
            .view([1, 3, size, size])
            .to_device(self.device);

        let output = {
            let model = self.model.lock().map_err(|_| InferenceError::LockPoisoned)?;
            tch::no_grad(|| model.forward_is(&[IValue::Tensor(input)]))?
        };
        let logits = first_tensor(output)?;
        let probabilities = logits
            .softmax(-1, Kind::Float)
            .to_device(Device::Cpu)
            .contiguous()
            .view([-1]);
        Ok(Vec::<f32>::try_from(probabilities)?)
    }
}
