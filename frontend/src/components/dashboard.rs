use super::super::{Model, Msg, Page, WeatherState};
use crate::weather::weather_info;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_dashboard(model: &Model, link: &Scope<Model>) -> Html {
    let action = |page: Page, icon: &'static str, title: &'static str, description: &'static str| {
        html! {
            <button class="action-card" onclick={link.callback(move |_| Msg::ShowPage(page))}>
                <i class={classes!("fa-solid", icon)}></i>
                <div>
                    <p class="action-title">{ title }</p>
                    <p class="action-description">{ description }</p>
                </div>
            </button>
        }
    };

    html! {
        <section class="dashboard">
            <h2>{"Dashboard"}</h2>
            <div class="dashboard-grid">
                { render_weather_card(&model.weather) }
                <div class="actions">
                    { action(Page::CropDoctor, "fa-leaf", "Crop Doctor", "Diagnose a plant disease") }
                    { action(Page::AgriBot, "fa-robot", "Agri-Bot", "Ask our AI for advice") }
                </div>
            </div>
        </section>
    }
}

fn render_weather_card(weather: &WeatherState) -> Html {
    match weather {
        WeatherState::Loading => html! {
            <div class="weather-card pending"><p>{"Loading Weather..."}</p></div>
        },
        WeatherState::Failed => html! {
            <div class="weather-card pending"><p>{"Could not load weather data."}</p></div>
        },
        WeatherState::Loaded(current) => {
            let info = weather_info(current.weathercode);
            html! {
                <div class="weather-card">
                    <div>
                        <p class="weather-place">{"Hyderabad Weather"}</p>
                        <p class="weather-temperature">{ format!("{}°C", current.temperature) }</p>
                        <p class="weather-description">{ info.description }</p>
                    </div>
                    <i class={classes!("fa-solid", info.icon, "weather-icon")}></i>
                </div>
            }
        }
    }
}
