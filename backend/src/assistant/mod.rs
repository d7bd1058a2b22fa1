pub mod gemini;
pub mod prompts;

use shared::Language;

use self::gemini::{GenerationError, TextGenerator};

/// Shown when no generation client was configured.
pub const NO_RECOMMENDATION: &str = "Could not get a recommendation.";
/// Shown when the generation call itself failed.
pub const RECOMMENDATION_FAILED: &str =
    "Failed to generate a recommendation due to an API error.";

/// Localized organic-treatment advice for a diagnosed label. Never fails:
/// generation problems turn into placeholder text.
pub async fn recommend_treatment(
    generator: Option<&dyn TextGenerator>,
    label: &str,
    language: Language,
) -> String {
    let Some(generator) = generator else {
        log::warn!("Generation client unavailable, skipping recommendation");
        return NO_RECOMMENDATION.to_string();
    };

    match generator.generate(&prompts::treatment_prompt(label, language)).await {
        Ok(text) => {
            log::info!(
                "Successfully received recommendation from Gemini in {}.",
                language.name()
            );
            text
        }
        Err(e) => {
            log::error!("Gemini API call failed: {}", e);
            RECOMMENDATION_FAILED.to_string()
        }
    }
}

pub async fn answer_question(
    generator: &dyn TextGenerator,
    question: &str,
    language: Language,
) -> Result<String, GenerationError> {
    let answer = generator
        .generate(&prompts::farmer_question_prompt(question, language))
        .await?;
    log::info!("Successfully received answer from Gemini for Agri-Bot.");
    Ok(answer)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::gemini::{GenerationError, TextGenerator};

    /// Generator that records prompts and replies with a fixed outcome.
    pub struct ScriptedGenerator {
        pub reply: Option<String>,
        pub prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedGenerator {
        pub fn answering(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or_else(|| GenerationError::ApiError {
                status: 429,
                message: "Resource has been exhausted".to_string(),
            })
        }
    }
}
