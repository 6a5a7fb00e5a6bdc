use super::super::Dashboard;
use super::{preview_area, results, upload_section};
use shared::Page;
use yew::prelude::*;

pub fn render_identify(model: &Dashboard, ctx: &Context<Dashboard>) -> Html {
    html! {
        <section class="page identify">
            <h1>{ Page::DiseaseIdentification.heading() }</h1>
            { upload_section::render_upload_section(model, ctx) }
            { preview_area::render_preview_area(model, ctx) }
            { results::render_results(model, ctx) }
        </section>
    }
}
