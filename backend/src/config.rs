use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Process settings taken from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: String,
    pub workers: Option<usize>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub detector_path: PathBuf,
    pub class_names_path: PathBuf,
    pub classifier_path: PathBuf,
    pub inference_config_path: PathBuf,
    pub frontend_dir: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let frontend_dir = non_empty("FRONTEND_DIR").map(PathBuf::from).or_else(|| {
            non_empty("CARGO_MANIFEST_DIR")
                .map(|manifest_dir| PathBuf::from(format!("{}/../frontend/dist", manifest_dir)))
        });

        Self {
            port: non_empty("PORT").unwrap_or_else(|| "5000".to_string()),
            workers: non_empty("WORKERS").and_then(|value| match value.parse::<usize>() {
                Ok(workers) if workers > 0 => Some(workers),
                _ => {
                    log::warn!("Ignoring WORKERS={}, expected a positive integer", value);
                    None
                }
            }),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL"),
            detector_path: non_empty("DETECTOR_MODEL_PATH")
                .unwrap_or_else(|| "best.torchscript".to_string())
                .into(),
            class_names_path: non_empty("CLASS_NAMES_PATH")
                .unwrap_or_else(|| "class_names.json".to_string())
                .into(),
            classifier_path: non_empty("CLASSIFIER_MODEL_PATH")
                .unwrap_or_else(|| "vit_model.pt".to_string())
                .into(),
            inference_config_path: non_empty("INFERENCE_CONFIG")
                .unwrap_or_else(|| "config/inference.yaml".to_string())
                .into(),
            frontend_dir,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Tunables for the detector, classifier and generation client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    pub detector: DetectorConfig,
    pub classifier: ClassifierConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub input_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_size: 224,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

impl InferenceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path)?;
        let config: InferenceConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    /// Reads the YAML tunables, keeping the built-in defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded inference settings from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "No inference settings at {}, using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                log::warn!(
                    "Ignoring inference settings at {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
