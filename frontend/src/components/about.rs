use shared::Page;
use yew::prelude::*;

pub fn render_about() -> Html {
    html! {
        <section class="page about">
            <h1>{ Page::About.heading() }</h1>
            <p>
                {"Retinal OCT captures high-resolution cross sections of the retina. The \
                  classifier was trained on a dataset of "}
                <strong>{"84,495 images"}</strong>
                {" labelled "}<strong>{"CNV, DME, Drusen and Normal"}</strong>
                {", each label checked through several rounds of expert grading."}
            </p>
            <p>
                <strong>{"Dataset sources: "}</strong>
                {"Shiley Eye Institute, California Retinal Research Foundation, Medical Center \
                  Ophthalmology Associates, Shanghai First People's Hospital and Beijing Tongren \
                  Eye Center."}
            </p>
            <p>
                {"Every image passed a tiered review by trained graders, ophthalmologists and \
                  senior retinal specialists before it was used for training."}
            </p>
            <p class="disclaimer">
                {"Predictions are decision support only and do not replace a clinical diagnosis."}
            </p>
        </section>
    }
}
