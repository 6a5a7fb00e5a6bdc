mod api;
mod components;

use components::handlers;
use components::{about, home, identify, sidebar, utils};
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_storage::{LocalStorage, Storage};
use shared::{Page, PredictionResponse};
use web_sys::DragEvent;
use yew::prelude::*;

pub struct Upload {
    pub file: GlooFile,
    pub preview_url: ObjectUrl,
}

pub enum Msg {
    // Navigation
    SelectPage(Page),

    // Upload
    FileChosen(GlooFile),
    SetDragging(bool),
    HandleDrop(DragEvent),

    // Analysis
    Predict,
    PredictionReceived(PredictionResponse),
    PredictionFailed(String),

    // UI state
    SetError(Option<String>),
    ToggleLearnMore,
}

pub struct Dashboard {
    pub page: Page,
    pub upload: Option<Upload>,
    pub result: Option<PredictionResponse>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_dragging: bool,
    pub learn_more_open: bool,
}

impl Component for Dashboard {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let page = LocalStorage::get::<Page>(Page::STORAGE_KEY).unwrap_or_default();
        Self {
            page,
            upload: None,
            result: None,
            loading: false,
            error: None,
            is_dragging: false,
            learn_more_open: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SelectPage(page) => handlers::handle_select_page(self, page),

            Msg::FileChosen(file) => handlers::handle_file_chosen(self, file),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),

            Msg::Predict => handlers::handle_predict(self, ctx),
            Msg::PredictionReceived(response) => handlers::handle_prediction(self, response),
            Msg::PredictionFailed(message) => {
                log::warn!("Prediction failed: {}", message);
                self.loading = false;
                self.result = None;
                self.error = Some(message);
                true
            }

            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::ToggleLearnMore => {
                self.learn_more_open = !self.learn_more_open;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { sidebar::render_sidebar(self.page, ctx.link()) }

                <main class="main-content">
                    {
                        if self.page.runs_inference() {
                            identify::render_identify(self, ctx)
                        } else if self.page == Page::About {
                            about::render_about()
                        } else {
                            home::render_home()
                        }
                    }
                    { utils::render_error_message(self.error.as_deref()) }
                </main>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("OCTLens dashboard starting...");
    yew::Renderer::<Dashboard>::new().render();
}
