use super::super::{Model, Msg};
use super::utils::{first_image_file, format_confidence, render_error_message};
use shared::{DiagnosisResponse, display_disease_name};
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_crop_doctor(model: &Model, link: &Scope<Model>) -> Html {
    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_image_file);
        input.set_value("");

        match file {
            Some(file) => Msg::FileSelected(file),
            None => Msg::SetError(Some("Please choose an image file.".into())),
        }
    });

    let can_diagnose = model.upload.is_some() && !model.diagnosing;

    html! {
        <section class="crop-doctor">
            <div class="upload-section">
                <label for="file-input" class="upload-button">
                    <i class="fa-solid fa-upload"></i>{" Choose leaf photo"}
                </label>
                <input
                    id="file-input"
                    type="file"
                    accept="image/*"
                    style="display: none;"
                    onchange={handle_change}
                />
                { render_preview(model) }
                <button
                    class="analyze-button"
                    disabled={!can_diagnose}
                    onclick={link.callback(|_| Msg::Diagnose)}
                >
                    { if model.diagnosing { "Diagnosing..." } else { "Diagnose" } }
                </button>
            </div>
            { render_error_message(model) }
            { model.diagnosis.as_ref().map(render_diagnosis).unwrap_or_default() }
        </section>
    }
}

fn render_preview(model: &Model) -> Html {
    match &model.upload {
        Some(upload) => html! {
            <div class="preview-area">
                <img src={upload.preview_url.to_string()} alt={upload.file.name()} class="preview-image" />
                <span class="preview-filename">{ upload.file.name() }</span>
            </div>
        },
        None => html! {
            <p class="preview-placeholder">{"No image selected yet."}</p>
        },
    }
}

fn render_diagnosis(diagnosis: &DiagnosisResponse) -> Html {
    let healthy = diagnosis.disease.to_lowercase().contains("healthy");
    html! {
        <div class={classes!("results-container", if healthy { "healthy" } else { "diseased" })}>
            <div class="result-header">
                <h2>{ display_disease_name(&diagnosis.disease) }</h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", diagnosis.confidence * 100.0)}></div>
                    </div>
                    <div class="meter-value">{ format_confidence(diagnosis.confidence) }</div>
                </div>
            </div>
            <div class="recommendation">
                <h3>{"Recommended treatment"}</h3>
                { for diagnosis.recommendation.lines().filter(|line| !line.trim().is_empty()).map(|line| html! {
                    <p>{ line }</p>
                })}
            </div>
        </div>
    }
}
