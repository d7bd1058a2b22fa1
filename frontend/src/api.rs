use gloo_console::error;
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{AskBotRequest, BotResponse, DiagnosisResponse, ErrorResponse, Language};

use crate::weather::{CurrentWeather, FORECAST_URL, Forecast};

/// Uploads one leaf image with the preferred recommendation language.
pub async fn diagnose(file: &GlooFile, language: Language) -> Result<DiagnosisResponse, String> {
    let form_data = web_sys::FormData::new().map_err(|_| "Failed to build upload form.".to_string())?;
    form_data
        .append_with_blob_and_filename("file", file.as_ref(), &file.name())
        .map_err(|_| "Failed to attach the image.".to_string())?;
    form_data
        .append_with_str("language", language.code())
        .map_err(|_| "Failed to attach the language.".to_string())?;

    let request = Request::post("/diagnose")
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?;
    let response = request
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read_json(response).await
}

pub async fn ask_bot(question: &str, language: Language) -> Result<BotResponse, String> {
    let body = AskBotRequest {
        question: question.to_string(),
        language: Some(language.code().to_string()),
    };
    let request = Request::post("/ask-bot")
        .json(&body)
        .map_err(|e| format!("Failed to build request: {}", e))?;
    let response = request
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read_json(response).await
}

pub async fn fetch_weather() -> Result<CurrentWeather, String> {
    let response = Request::get(FORECAST_URL)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    let forecast: Forecast = read_json(response).await?;
    Ok(forecast.current_weather)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e));
    }

    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("Server error: {}", status),
    };
    error!(format!("Request failed with {}: {}", status, message));
    Err(message)
}
