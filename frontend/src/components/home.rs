use shared::{DiseaseClass, Page};
use yew::prelude::*;

pub fn render_home() -> Html {
    html! {
        <section class="page home">
            <h1>{ Page::Home.heading() }</h1>
            <h2>{"Welcome to the Retinal OCT Analysis Platform"}</h2>
            <p>
                <strong>{"Optical Coherence Tomography (OCT)"}</strong>
                {" produces high-resolution cross-sectional images of the retina, which makes it \
                  possible to detect retinal disease early and follow it over time."}
            </p>

            <h3>{"Key Features"}</h3>
            <ul>
                <li>
                    <strong>{"Automated Image Analysis: "}</strong>
                    {"classifies OCT scans as Normal, CNV, DME or Drusen."}
                </li>
                <li>
                    <strong>{"Streamlined Workflow: "}</strong>
                    {"upload a scan, run the classifier and read the result on one page."}
                </li>
            </ul>

            <h3>{"Retinal Diseases"}</h3>
            <ol>
                { for DiseaseClass::ALL.iter().map(|class| html! {
                    <li>
                        <strong>{ class.full_name() }</strong>
                        {": "}{ class.caption().emphasis }
                    </li>
                }) }
            </ol>

            <h3>{"Get Started"}</h3>
            <p>
                {"Choose "}<em>{ Page::DiseaseIdentification.to_string() }</em>
                {" in the sidebar to upload an OCT image and view the diagnostic details."}
            </p>
        </section>
    }
}
