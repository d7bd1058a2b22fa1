pub mod classifier;
pub mod detector;
pub mod labels;
pub mod pipeline;
pub mod preprocess;

use tch::{IValue, Tensor};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Torch error: {0}")]
    Model(#[from] tch::TchError),
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),
    #[error("Classifier produced {got} scores but {expected} labels are configured")]
    LabelMismatch { expected: usize, got: usize },
    #[error("Model lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid label list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Label list is empty")]
    EmptyLabels,
    #[error("Failed to load TorchScript module: {0}")]
    Torch(#[from] tch::TchError),
    #[error("Warm-up inference failed: {0}")]
    WarmUp(#[from] InferenceError),
    #[error("Classifier has {got} outputs but the label list has {expected} entries")]
    WidthMismatch { expected: usize, got: usize },
}

/// Pulls the first tensor out of a TorchScript return value. Exported
/// detectors return a bare tensor, exported transformers usually a tuple
/// whose first element holds the logits.
pub(crate) fn first_tensor(value: IValue) -> Result<Tensor, InferenceError> {
    match value {
        IValue::Tensor(tensor) => Ok(tensor),
        IValue::Tuple(values) | IValue::GenericList(values) => values
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::UnexpectedOutput("empty tuple".to_string()))
            .and_then(first_tensor),
        IValue::TensorList(tensors) => tensors
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::UnexpectedOutput("empty tensor list".to_string())),
        other => Err(InferenceError::UnexpectedOutput(format!(
            "expected a tensor, got {:?}",
            other
        ))),
    }
}
