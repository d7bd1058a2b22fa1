use super::super::{ChatEntry, Model, Msg, Speaker};
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_agri_bot(model: &Model, link: &Scope<Model>) -> Html {
    let on_input = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetQuestion(input.value())
    });
    let on_submit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::AskQuestion
    });

    html! {
        <section class="agri-bot">
            <div class="chat-log">
                { for model.chat.iter().map(render_entry) }
                { if model.asking {
                    html! { <div class="chat-entry bot pending">{"Thinking..."}</div> }
                } else {
                    html! {}
                }}
            </div>
            <form class="chat-form" onsubmit={on_submit}>
                <input
                    type="text"
                    class="chat-input"
                    placeholder="Type your question"
                    value={model.question.clone()}
                    oninput={on_input}
                    disabled={model.asking}
                />
                <button type="submit" class="send-button" disabled={model.asking || model.question.trim().is_empty()}>
                    <i class="fa-solid fa-paper-plane"></i>
                </button>
            </form>
        </section>
    }
}

fn render_entry(entry: &ChatEntry) -> Html {
    let class = match entry.speaker {
        Speaker::Farmer => "farmer",
        Speaker::Bot => "bot",
        Speaker::Error => "error",
    };
    html! {
        <div class={classes!("chat-entry", class)}>{ &entry.text }</div>
    }
}
