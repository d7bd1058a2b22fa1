use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

pub use strum::IntoEnumIterator;

/// Languages a recommendation or answer can be written in.
///
/// Codes outside this table fall back to English rather than being rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "te")]
    Telugu,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::English,
            "hi" => Language::Hindi,
            "te" => Language::Telugu,
            _ => Language::English,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Telugu => "te",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiagnosisResponse {
    pub disease: String,
    pub confidence: f32,
    pub recommendation: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AskBotRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BotResponse {
    pub answer: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Turns a raw class label such as `Tomato___Late_blight` into `Tomato Late blight`.
pub fn display_disease_name(label: &str) -> String {
    label.replace("___", " ").replace('_', " ")
}
