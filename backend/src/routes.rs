use actix_files::Files;
use actix_multipart::{Multipart, MultipartError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use log::{debug, error, info, warn};
use serde_json::Value;
use shared::{BotResponse, DiagnosisResponse, ErrorResponse, Language};
use std::path::PathBuf;
use uuid::Uuid;

use crate::assistant;
use crate::context::AppContext;

const NO_FILE_PART: &str = "No file part in the request";
const NO_SELECTED_FILE: &str = "No selected file";
const MODEL_NOT_LOADED: &str = "A model is not loaded, check server logs.";
const PROCESSING_FAILED: &str = "Failed to process the image.";
const NO_QUESTION: &str = "No question provided";
const ASSISTANT_NOT_LOADED: &str = "Gemini model not loaded.";
const ASSISTANT_FAILED: &str = "Failed to get an answer from the AI assistant.";

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<PathBuf>) {
    cfg.service(web::resource("/diagnose").route(web::post().to(diagnose)))
        .service(web::resource("/ask-bot").route(web::post().to(ask_bot)));

    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(message))
}

struct UploadedImage {
    filename: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct DiagnoseForm {
    file: Option<UploadedImage>,
    language: Option<String>,
}

/// Collects the `file` and `language` parts. A `file` part only counts as an
/// upload when it carries a filename; anything else is ignored.
async fn read_diagnose_form(mut payload: Multipart) -> Result<DiagnoseForm, MultipartError> {
    let mut form = DiagnoseForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        match (name.as_str(), filename) {
            ("file", Some(filename)) if form.file.is_none() => {
                form.file = Some(UploadedImage {
                    filename,
                    bytes: data,
                });
            }
            ("language", None) if form.language.is_none() => {
                form.language = Some(String::from_utf8_lossy(&data).into_owned());
            }
            _ => debug!("Ignoring form field: {}", name),
        }
    }

    Ok(form)
}

async fn diagnose(context: web::Data<AppContext>, payload: Multipart) -> HttpResponse {
    let request_id = Uuid::new_v4();

    let form = match read_diagnose_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            warn!("[{}] Unreadable multipart body: {}", request_id, e);
            return error_response(StatusCode::BAD_REQUEST, NO_FILE_PART);
        }
    };
    let Some(upload) = form.file else {
        return error_response(StatusCode::BAD_REQUEST, NO_FILE_PART);
    };
    if upload.filename.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, NO_SELECTED_FILE);
    }

    let language = Language::from_code(form.language.as_deref().unwrap_or("en"));
    info!(
        "[{}] Request received for language: {} ({}, {} bytes)",
        request_id,
        language.name(),
        upload.filename,
        upload.bytes.len()
    );

    let Some(pipeline) = context.pipeline.ready().cloned() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MODEL_NOT_LOADED);
    };

    let diagnosis = match web::block(move || pipeline.diagnose(&upload.bytes)).await {
        Ok(Ok(diagnosis)) => diagnosis,
        Ok(Err(e)) => {
            error!("[{}] An error occurred during diagnosis: {}", request_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED);
        }
        Err(e) => {
            error!("[{}] Diagnosis task did not complete: {}", request_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED);
        }
    };
    info!(
        "[{}] Diagnosis: {} with confidence {:.4}",
        request_id, diagnosis.label, diagnosis.confidence
    );

    let recommendation = assistant::recommend_treatment(
        context.assistant.ready().map(|generator| generator.as_ref()),
        &diagnosis.label,
        language,
    )
    .await;

    HttpResponse::Ok().json(DiagnosisResponse {
        disease: diagnosis.label,
        confidence: diagnosis.confidence,
        recommendation,
    })
}

/// Pulls `question` and `language` out of an arbitrary body. `None` when the
/// body is not a JSON object with a non-null `question`.
fn parse_bot_request(body: &[u8]) -> Option<(String, Language)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    let question = match object.get("question")? {
        Value::Null => return None,
        Value::String(question) => question.clone(),
        other => other.to_string(),
    };
    let language = object
        .get("language")
        .and_then(Value::as_str)
        .map(Language::from_code)
        .unwrap_or_default();
    Some((question, language))
}

async fn ask_bot(context: web::Data<AppContext>, body: web::Bytes) -> HttpResponse {
    let Some((question, language)) = parse_bot_request(&body) else {
        return error_response(StatusCode::BAD_REQUEST, NO_QUESTION);
    };
    info!(
        "Received question for Agri-Bot in {}: {}",
        language.name(),
        question
    );

    let Some(generator) = context.assistant.ready() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, ASSISTANT_NOT_LOADED);
    };

    match assistant::answer_question(generator.as_ref(), &question, language).await {
        Ok(answer) => HttpResponse::Ok().json(BotResponse { answer }),
        Err(e) => {
            error!("Gemini API call for Agri-Bot failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, ASSISTANT_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::gemini::TextGenerator;
    use crate::assistant::testing::ScriptedGenerator;
    use crate::assistant::{NO_RECOMMENDATION, RECOMMENDATION_FAILED, prompts};
    use crate::context::Component;
    use crate::vision::detector::BoundingBox;
    use crate::vision::pipeline::DiagnosisPipeline;
    use crate::vision::pipeline::testing::{FixedClassifier, FixedDetector, png_bytes, tomato_labels};
    use actix_web::{App, test};
    use std::sync::{Arc, Mutex};

    const BOUNDARY: &str = "leafboundary";

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        data: &'a [u8],
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part.filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn diagnose_request(parts: &[Part]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/diagnose")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
    }

    fn ready_pipeline(probabilities: Vec<f32>) -> Component<Arc<DiagnosisPipeline>> {
        let leaf = BoundingBox {
            x1: 4.0,
            y1: 4.0,
            x2: 28.0,
            y2: 20.0,
            confidence: 0.9,
            class_id: 0,
        };
        Component::Ready(Arc::new(DiagnosisPipeline::new(
            Box::new(FixedDetector(vec![leaf])),
            Box::new(FixedClassifier::new(probabilities)),
            tomato_labels(),
        )))
    }

    fn scripted(generator: ScriptedGenerator) -> Component<Arc<dyn TextGenerator>> {
        Component::Ready(Arc::new(generator) as Arc<dyn TextGenerator>)
    }

    macro_rules! service {
        ($context:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($context))
                    .configure(|cfg| configure_routes(cfg, None)),
            )
            .await
        };
    }

    async fn error_of(response: actix_web::dev::ServiceResponse) -> String {
        let body: ErrorResponse = test::read_body_json(response).await;
        body.error
    }

    #[actix_web::test]
    async fn diagnose_without_file_part_is_rejected() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: Component::Unavailable,
        });

        let req = diagnose_request(&[Part {
            name: "language",
            filename: None,
            data: b"hi",
        }])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, NO_FILE_PART);
    }

    #[actix_web::test]
    async fn diagnose_with_non_multipart_body_is_rejected() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: Component::Unavailable,
        });

        let req = test::TestRequest::post()
            .uri("/diagnose")
            .set_json(serde_json::json!({"file": "leaf.png"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, NO_FILE_PART);
    }

    #[actix_web::test]
    async fn diagnose_with_empty_filename_is_rejected() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: Component::Unavailable,
        });

        let req = diagnose_request(&[Part {
            name: "file",
            filename: Some(""),
            data: b"",
        }])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, NO_SELECTED_FILE);
    }

    #[actix_web::test]
    async fn diagnose_without_models_reports_unloaded() {
        let app = service!(AppContext {
            pipeline: Component::Failed("detector: missing".to_string()),
            assistant: Component::Unavailable,
        });

        let image = png_bytes(32, 24);
        let req = diagnose_request(&[Part {
            name: "file",
            filename: Some("leaf.png"),
            data: &image,
        }])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(resp).await, MODEL_NOT_LOADED);
    }

    #[actix_web::test]
    async fn diagnose_with_corrupt_image_hides_the_cause() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: Component::Unavailable,
        });

        let req = diagnose_request(&[Part {
            name: "file",
            filename: Some("leaf.jpg"),
            data: b"\xff\xd8\xff truncated jpeg",
        }])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(resp).await, PROCESSING_FAILED);
    }

    #[actix_web::test]
    async fn diagnose_returns_label_confidence_and_recommendation() {
        let generator = ScriptedGenerator::answering("ఆకు మచ్చ తెగులు: వేప నూనె వాడండి.");
        let prompts_seen = generator.prompts.clone();
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.15, 0.8, 0.05]),
            assistant: scripted(generator),
        });

        let image = png_bytes(32, 24);
        let req = diagnose_request(&[
            Part {
                name: "file",
                filename: Some("leaf.png"),
                data: &image,
            },
            Part {
                name: "language",
                filename: None,
                data: b"te",
            },
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: DiagnosisResponse = test::read_body_json(resp).await;
        assert_eq!(body.disease, "Tomato___Late_blight");
        assert!((0.0..=1.0).contains(&body.confidence));
        let labels = tomato_labels();
        assert!((0..labels.len()).any(|i| labels.get(i) == Some(body.disease.as_str())));
        assert_eq!(body.recommendation, "ఆకు మచ్చ తెగులు: వేప నూనె వాడండి.");
        assert_eq!(
            prompts_seen.lock().unwrap().as_slice(),
            &[prompts::treatment_prompt("Tomato___Late_blight", Language::Telugu)]
        );
    }

    #[actix_web::test]
    async fn diagnose_is_repeatable_for_the_same_upload() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.7, 0.2, 0.1]),
            assistant: Component::Unavailable,
        });
        let image = png_bytes(32, 24);

        let mut results = Vec::new();
        for _ in 0..2 {
            let req = diagnose_request(&[Part {
                name: "file",
                filename: Some("leaf.png"),
                data: &image,
            }])
            .to_request();
            let body: DiagnosisResponse = test::call_and_read_body_json(&app, req).await;
            results.push((body.disease, body.confidence));
        }
        assert_eq!(results[0], results[1]);
    }

    #[actix_web::test]
    async fn language_field_may_precede_the_file() {
        let generator = ScriptedGenerator::answering("ok");
        let prompts_seen = generator.prompts.clone();
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.1, 0.8]),
            assistant: scripted(generator),
        });

        let image = png_bytes(16, 16);
        let req = diagnose_request(&[
            Part {
                name: "language",
                filename: None,
                data: b"hi",
            },
            Part {
                name: "file",
                filename: Some("leaf.png"),
                data: &image,
            },
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(prompts_seen.lock().unwrap()[0].contains("in the Hindi language"));
    }

    #[actix_web::test]
    async fn diagnose_without_assistant_uses_placeholder() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: Component::Unavailable,
        });

        let image = png_bytes(32, 24);
        let req = diagnose_request(&[Part {
            name: "file",
            filename: Some("leaf.png"),
            data: &image,
        }])
        .to_request();
        let body: DiagnosisResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.recommendation, NO_RECOMMENDATION);
    }

    #[actix_web::test]
    async fn diagnose_survives_a_failing_assistant() {
        let app = service!(AppContext {
            pipeline: ready_pipeline(vec![0.1, 0.8, 0.1]),
            assistant: scripted(ScriptedGenerator::failing()),
        });

        let image = png_bytes(32, 24);
        let req = diagnose_request(&[Part {
            name: "file",
            filename: Some("leaf.png"),
            data: &image,
        }])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: DiagnosisResponse = test::read_body_json(resp).await;
        assert_eq!(body.recommendation, RECOMMENDATION_FAILED);
    }

    #[test]
    fn bot_request_parsing() {
        assert_eq!(
            parse_bot_request(br#"{"question": "When to sow?", "language": "hi"}"#),
            Some(("When to sow?".to_string(), Language::Hindi))
        );
        assert_eq!(
            parse_bot_request(br#"{"question": "When to sow?", "language": "fr"}"#),
            Some(("When to sow?".to_string(), Language::English))
        );
        assert_eq!(
            parse_bot_request(br#"{"question": 42}"#),
            Some(("42".to_string(), Language::English))
        );
        assert_eq!(parse_bot_request(b""), None);
        assert_eq!(parse_bot_request(b"{}"), None);
        assert_eq!(parse_bot_request(br#"["question"]"#), None);
        assert_eq!(parse_bot_request(br#"{"question": null}"#), None);
        assert_eq!(parse_bot_request(br#"{"language": "te"}"#), None);
    }

    #[actix_web::test]
    async fn ask_bot_without_question_is_rejected() {
        let app = service!(AppContext {
            pipeline: Component::Unavailable,
            assistant: scripted(ScriptedGenerator::answering("unused")),
        });

        for body in [r#"{"language": "te"}"#, "", "not json"] {
            let req = test::TestRequest::post()
                .uri("/ask-bot")
                .insert_header(("content-type", "application/json"))
                .set_payload(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_of(resp).await, NO_QUESTION);
        }
    }

    #[actix_web::test]
    async fn ask_bot_without_assistant_reports_unloaded() {
        let app = service!(AppContext {
            pipeline: Component::Unavailable,
            assistant: Component::Unavailable,
        });

        let req = test::TestRequest::post()
            .uri("/ask-bot")
            .set_json(serde_json::json!({"question": "Best fertilizer for chilli?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(resp).await, ASSISTANT_NOT_LOADED);
    }

    #[actix_web::test]
    async fn ask_bot_reports_generation_failure() {
        let app = service!(AppContext {
            pipeline: Component::Unavailable,
            assistant: scripted(ScriptedGenerator::failing()),
        });

        let req = test::TestRequest::post()
            .uri("/ask-bot")
            .set_json(serde_json::json!({"question": "Best fertilizer for chilli?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(resp).await, ASSISTANT_FAILED);
    }

    #[actix_web::test]
    async fn ask_bot_answers_in_the_requested_language() {
        let generator = ScriptedGenerator::answering("Use vermicompost.");
        let prompts_seen: Arc<Mutex<Vec<String>>> = generator.prompts.clone();
        let app = service!(AppContext {
            pipeline: Component::Unavailable,
            assistant: scripted(generator),
        });

        let req = test::TestRequest::post()
            .uri("/ask-bot")
            .set_json(serde_json::json!({"question": "Best fertilizer for chilli?", "language": "te"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: BotResponse = test::read_body_json(resp).await;
        assert_eq!(body.answer, "Use vermicompost.");
        assert_eq!(
            prompts_seen.lock().unwrap().as_slice(),
            &[prompts::farmer_question_prompt("Best fertilizer for chilli?", Language::Telugu)]
        );
    }
}
