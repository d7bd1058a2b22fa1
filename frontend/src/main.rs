mod api;
mod components;
mod i18n;
mod weather;

use components::agri_bot::render_agri_bot;
use components::crop_doctor::render_crop_doctor;
use components::dashboard::render_dashboard;
use components::header::render_header;
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_storage::{LocalStorage, Storage};
use shared::{DiagnosisResponse, Language};
use wasm_bindgen_futures::spawn_local;
use weather::CurrentWeather;
use yew::prelude::*;

const LANGUAGE_KEY: &str = "cropdoc.language";
const THEME_KEY: &str = "cropdoc.theme";

#[derive(Clone, Copy, PartialEq)]
enum Page {
    Dashboard,
    CropDoctor,
    AgriBot,
}

#[derive(Clone, Copy, PartialEq)]
enum Theme {
    Light,
    Dark,
}

enum WeatherState {
    Loading,
    Loaded(CurrentWeather),
    Failed,
}

struct Upload {
    file: GlooFile,
    preview_url: ObjectUrl,
}

#[derive(Clone, Copy, PartialEq)]
enum Speaker {
    Farmer,
    Bot,
    Error,
}

struct ChatEntry {
    speaker: Speaker,
    text: String,
}

enum Msg {
    ShowPage(Page),
    SetLanguage(Language),
    ToggleTheme,
    SetError(Option<String>),
    WeatherLoaded(Result<CurrentWeather, String>),

    // Crop Doctor
    FileSelected(GlooFile),
    Diagnose,
    DiagnosisFinished(Result<DiagnosisResponse, String>),

    // Agri-Bot
    SetQuestion(String),
    AskQuestion,
    AnswerFinished(Result<String, String>),
}

struct Model {
    page: Page,
    language: Language,
    theme: Theme,
    error: Option<String>,
    weather: WeatherState,
    upload: Option<Upload>,
    diagnosing: bool,
    diagnosis: Option<DiagnosisResponse>,
    question: String,
    asking: bool,
    chat: Vec<ChatEntry>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let language = LocalStorage::get::<Language>(LANGUAGE_KEY).unwrap_or_default();
        let theme = stored_theme(LocalStorage::get::<String>(THEME_KEY).ok().as_deref());
        apply_theme(theme);

        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(Msg::WeatherLoaded(api::fetch_weather().await));
        });

        Self {
            page: Page::Dashboard,
            language,
            theme,
            error: None,
            weather: WeatherState::Loading,
            upload: None,
            diagnosing: false,
            diagnosis: None,
            question: String::new(),
            asking: false,
            chat: greeting(language),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::ShowPage(page) => {
                self.page = page;
                self.error = None;
                true
            }
            Msg::SetLanguage(language) => {
                if language != self.language {
                    self.chat = greeting(language);
                }
                self.language = language;
                if let Err(e) = LocalStorage::set(LANGUAGE_KEY, language) {
                    log::warn!("Could not persist language: {}", e);
                }
                true
            }
            Msg::ToggleTheme => self.handle_toggle_theme(),
            Msg::WeatherLoaded(result) => {
                self.weather = match result {
                    Ok(current) => WeatherState::Loaded(current),
                    Err(e) => {
                        log::error!("Failed to fetch weather: {}", e);
                        WeatherState::Failed
                    }
                };
                true
            }
            Msg::SetError(error) => {
                self.error = error;
                true
            }

            Msg::FileSelected(file) => {
                let preview_url = ObjectUrl::from(file.clone());
                self.upload = Some(Upload { file, preview_url });
                self.diagnosis = None;
                self.error = None;
                true
            }
            Msg::Diagnose => self.handle_diagnose(ctx),
            Msg::DiagnosisFinished(result) => {
                self.diagnosing = false;
                match result {
                    Ok(diagnosis) => {
                        self.diagnosis = Some(diagnosis);
                        self.error = None;
                    }
                    Err(e) => self.error = Some(e),
                }
                true
            }

            Msg::SetQuestion(question) => {
                self.question = question;
                true
            }
            Msg::AskQuestion => self.handle_ask_question(ctx),
            Msg::AnswerFinished(result) => {
                self.asking = false;
                self.chat.push(match result {
                    Ok(answer) => ChatEntry {
                        speaker: Speaker::Bot,
                        text: answer,
                    },
                    Err(e) => {
                        log::error!("Agri-Bot request failed: {}", e);
                        ChatEntry {
                            speaker: Speaker::Error,
                            text: i18n::bot_error(self.language).to_string(),
                        }
                    }
                });
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class="container">
                { render_header(self, link) }

                <main class="main-content">
                { match self.page {
                    Page::Dashboard => render_dashboard(self, link),
                    Page::CropDoctor => render_crop_doctor(self, link),
                    Page::AgriBot => render_agri_bot(self, link),
                }}
                </main>

                <footer class="app-footer">
                    <p>{"Crop Doctor | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

impl Model {
    fn handle_diagnose(&mut self, ctx: &Context<Self>) -> bool {
        let Some(upload) = &self.upload else {
            ctx.link()
                .send_message(Msg::SetError(Some("No file selected for analysis.".into())));
            return false;
        };
        if self.diagnosing {
            return false;
        }

        self.diagnosing = true;
        self.error = None;
        let file = upload.file.clone();
        let language = self.language;
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = api::diagnose(&file, language).await;
            link.send_message(Msg::DiagnosisFinished(result));
        });
        true
    }

    fn handle_ask_question(&mut self, ctx: &Context<Self>) -> bool {
        let question = self.question.trim().to_string();
        if question.is_empty() || self.asking {
            return false;
        }

        self.asking = true;
        self.question.clear();
        self.chat.push(ChatEntry {
            speaker: Speaker::Farmer,
            text: question.clone(),
        });
        let language = self.language;
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = api::ask_bot(&question, language)
                .await
                .map(|response| response.answer);
            link.send_message(Msg::AnswerFinished(result));
        });
        true
    }

    fn handle_toggle_theme(&mut self) -> bool {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        apply_theme(self.theme);

        let stored = if self.theme == Theme::Dark { "dark" } else { "light" };
        if let Err(e) = LocalStorage::set(THEME_KEY, stored) {
            log::warn!("Could not persist theme: {}", e);
        }
        true
    }
}

/// Dark unless the user picked light before.
fn stored_theme(stored: Option<&str>) -> Theme {
    match stored {
        Some("light") => Theme::Light,
        _ => Theme::Dark,
    }
}

fn greeting(language: Language) -> Vec<ChatEntry> {
    vec![ChatEntry {
        speaker: Speaker::Bot,
        text: i18n::initial_bot_message(language).to_string(),
    }]
}

fn apply_theme(theme: Theme) {
    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        return;
    };

    let result = match theme {
        Theme::Dark => body.class_list().add_1("dark-mode"),
        Theme::Light => body.class_list().remove_1("dark-mode"),
    };
    if result.is_err() {
        log::warn!("Could not update the page theme");
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
