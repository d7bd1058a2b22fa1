use std::fmt::Display;
use std::sync::Arc;

use tch::Device;

use crate::assistant::gemini::{GeminiClient, TextGenerator};
use crate::config::{InferenceConfig, ServiceConfig};
use crate::vision::classifier::TorchClassifier;
use crate::vision::detector::TorchDetector;
use crate::vision::labels::LabelSet;
use crate::vision::pipeline::DiagnosisPipeline;

/// Startup outcome of a dependency. Set once, never reloaded.
pub enum Component<T> {
    Ready(T),
    /// Not configured, e.g. no credential supplied.
    Unavailable,
    Failed(String),
}

impl<T> Component<T> {
    pub fn from_result<E: Display>(name: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => {
                log::info!("{} loaded successfully.", name);
                Component::Ready(value)
            }
            Err(e) => {
                log::error!("Error loading {}: {}", name, e);
                Component::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Component::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Component::Ready(_))
    }

    fn describe(&self) -> Option<String> {
        match self {
            Component::Ready(_) => None,
            Component::Unavailable => Some("not configured".to_string()),
            Component::Failed(reason) => Some(reason.clone()),
        }
    }
}

/// Everything request handlers need, built before the server starts and
/// shared read-only afterwards.
pub struct AppContext {
    pub pipeline: Component<Arc<DiagnosisPipeline>>,
    pub assistant: Component<Arc<dyn TextGenerator>>,
}

impl AppContext {
    pub fn load(config: &ServiceConfig, settings: &InferenceConfig) -> Self {
        let assistant = match &config.gemini_api_key {
            None => {
                log::warn!("GEMINI_API_KEY is not set; recommendations and Agri-Bot are disabled");
                Component::Unavailable
            }
            Some(api_key) => {
                let mut generation = settings.generation.clone();
                if let Some(model) = &config.gemini_model {
                    generation.model = model.clone();
                }
                Component::from_result(
                    "Gemini client",
                    GeminiClient::new(api_key.clone(), &generation).map(|client| {
                        log::info!("Using Gemini model {}", client.model());
                        Arc::new(client) as Arc<dyn TextGenerator>
                    }),
                )
            }
        };

        let device = Device::cuda_if_available();
        log::info!("Using device: {:?}", device);

        let detector = Component::from_result(
            "YOLO detector",
            TorchDetector::load(&config.detector_path, device, settings.detector.clone()),
        );
        let labels = Component::from_result("Class names", LabelSet::load(&config.class_names_path));
        let classifier = match labels.ready() {
            Some(labels) => Component::from_result(
                "ViT classifier",
                TorchClassifier::load(
                    &config.classifier_path,
                    device,
                    settings.classifier.clone(),
                    labels.len(),
                ),
            ),
            None => {
                log::error!("Skipping ViT classifier: class names are unavailable");
                Component::Failed("class names unavailable".to_string())
            }
        };

        let pipeline = assemble_pipeline(detector, classifier, labels);
        if let Some(pipeline) = pipeline.ready() {
            log::info!(
                "Diagnosis pipeline ready with {} classes",
                pipeline.labels().len()
            );
        }

        Self {
            pipeline,
            assistant,
        }
    }
}

fn assemble_pipeline(
    detector: Component<TorchDetector>,
    classifier: Component<TorchClassifier>,
    labels: Component<LabelSet>,
) -> Component<Arc<DiagnosisPipeline>> {
    match (detector, classifier, labels) {
        (Component::Ready(detector), Component::Ready(classifier), Component::Ready(labels)) => {
            Component::Ready(Arc::new(DiagnosisPipeline::new(
                Box::new(detector),
                Box::new(classifier),
                labels,
            )))
        }
        (detector, classifier, labels) => {
            let reasons: Vec<String> = [
                ("detector", detector.describe()),
                ("classifier", classifier.describe()),
                ("class names", labels.describe()),
            ]
            .into_iter()
            .filter_map(|(name, reason)| reason.map(|r| format!("{}: {}", name, r)))
            .collect();
            Component::Failed(reasons.join("; "))
        }
    }
}
