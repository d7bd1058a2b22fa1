use super::super::{Model, Msg, Page};
use super::theme_toggle::render_theme_toggle;
use shared::{IntoEnumIterator, Language};
use web_sys::HtmlSelectElement;
use yew::html::Scope;
use yew::prelude::*;

/// Title, page tabs, language picker and theme toggle.
pub fn render_header(model: &Model, link: &Scope<Model>) -> Html {
    let on_language = link.callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::SetLanguage(Language::from_code(&select.value()))
    });

    let tab = |page: Page, label: &'static str, icon: &'static str| {
        html! {
            <button
                class={classes!("tab", (model.page == page).then_some("active"))}
                onclick={link.callback(move |_| Msg::ShowPage(page))}
            >
                <i class={classes!("fa-solid", icon)}></i>{ format!(" {}", label) }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-seedling"></i>{" Crop Doctor"}</h1>
            <p class="subtitle">{"Diagnose leaf diseases and ask farming questions"}</p>
            <nav class="tabs">
                { tab(Page::Dashboard, "Dashboard", "fa-table-columns") }
                { tab(Page::CropDoctor, "Crop Doctor", "fa-leaf") }
                { tab(Page::AgriBot, "Agri-Bot", "fa-comments") }
            </nav>
            <div class="top-right">
                <select class="language-select" onchange={on_language}>
                    { for Language::iter().map(|language| html! {
                        <option
                            value={language.code()}
                            selected={language == model.language}
                        >
                            { language.name() }
                        </option>
                    })}
                </select>
                { render_theme_toggle(model, link) }
            </div>
        </header>
    }
}
