use super::super::{Dashboard, Msg};
use shared::{DiseaseClass, PredictionResponse};
use yew::prelude::*;

pub fn render_results(model: &Dashboard, ctx: &Context<Dashboard>) -> Html {
    let Some((response, class)) = model
        .result
        .as_ref()
        .and_then(|r| r.disease().map(|class| (r, class)))
    else {
        return html! {};
    };

    html! {
        <div class="results-container">
            <div class="success-message">
                <i class="fa-solid fa-circle-check"></i>
                <p>{"Prediction: "}<strong>{ class.label() }</strong></p>
            </div>
            { render_learn_more(class, response, model.learn_more_open, ctx) }
        </div>
    }
}

fn render_learn_more(
    class: DiseaseClass,
    response: &PredictionResponse,
    open: bool,
    ctx: &Context<Dashboard>,
) -> Html {
    let toggle = ctx.link().callback(|_| Msg::ToggleLearnMore);
    let caption = class.caption();
    let recommendation = class.recommendation();

    html! {
        <div class={classes!("expander", open.then_some("open"))}>
            <button class="expander-header" onclick={toggle} aria-expanded={open.to_string()}>
                <i class={if open { "fa-solid fa-chevron-down" } else { "fa-solid fa-chevron-right" }}></i>
                {" Learn More"}
            </button>
            if open {
                <div class="expander-body">
                    <p>{ caption.lead }{" "}<em>{ caption.emphasis }</em></p>
                    <h3>{ class.full_name() }</h3>
                    <p>{ recommendation.overview }</p>
                    <h4>{"Typical OCT findings"}</h4>
                    <ul>
                        { for recommendation.findings.iter().map(|f| html! { <li>{ *f }</li> }) }
                    </ul>
                    <h4>{"Recommended next steps"}</h4>
                    <ul>
                        { for recommendation.next_steps.iter().map(|s| html! { <li>{ *s }</li> }) }
                    </ul>
                    <p class="result-meta">
                        { format!("Model confidence {:.1}% | analysis {}", response.confidence * 100.0, response.request_id) }
                    </p>
                </div>
            }
        </div>
    }
}
