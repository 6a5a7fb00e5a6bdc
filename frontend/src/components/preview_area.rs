use super::super::{Dashboard, Msg};
use super::utils::debounce;
use yew::prelude::*;

pub fn render_preview_area(model: &Dashboard, ctx: &Context<Dashboard>) -> Html {
    let Some(upload) = &model.upload else {
        return html! {};
    };
    let link = ctx.link().clone();

    html! {
        <div id="preview-container">
            <figure>
                <img id="actual-image-preview"
                    src={upload.preview_url.to_string()}
                    alt={upload.file.name()}
                    style="width: 100%; object-fit: contain;" />
                <figcaption>{"Uploaded Image"}</figcaption>
            </figure>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    disabled={model.loading}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Predict)
                    })}
                >
                    { render_predict_button_content(model.loading) }
                </button>
            </div>
        </div>
    }
}

fn render_predict_button_content(loading: bool) -> Html {
    if loading {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing image..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Predict"}</> }
    }
}
