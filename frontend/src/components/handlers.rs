use super::super::{Dashboard, Msg, Upload};
use crate::api::request_prediction;
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_storage::{LocalStorage, Storage};
use shared::{Page, PredictionResponse, UploadFormat};
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, FileList};
use yew::prelude::*;

pub fn handle_select_page(model: &mut Dashboard, page: Page) -> bool {
    if model.page == page {
        return false;
    }
    if let Err(e) = LocalStorage::set(Page::STORAGE_KEY, page) {
        log::warn!("Could not remember selected page: {}", e);
    }
    model.page = page;
    model.error = None;
    true
}

pub fn handle_file_chosen(model: &mut Dashboard, file: GlooFile) -> bool {
    // Replacing the upload revokes the previous preview URL.
    let preview_url = ObjectUrl::from(file.clone());
    model.upload = Some(Upload { file, preview_url });
    model.result = None;
    model.error = None;
    model.learn_more_open = false;
    true
}

pub fn handle_drop(model: &mut Dashboard, ctx: &Context<Dashboard>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        ctx.link().send_message(select_single_file(&file_list));
    }
    true
}

/// Accepts exactly one jpg/jpeg/png file; anything else becomes an error
/// message and never reaches the backend.
pub fn select_single_file(file_list: &FileList) -> Msg {
    if file_list.length() != 1 {
        return Msg::SetError(Some("Please upload exactly one OCT image.".into()));
    }
    let Some(file) = file_list.item(0) else {
        return Msg::SetError(Some("No file selected.".into()));
    };

    match UploadFormat::from_file_name(&file.name()) {
        Ok(_) => Msg::FileChosen(GlooFile::from(file)),
        Err(e) => {
            log::warn!("Rejected upload {}: {}", file.name(), e);
            Msg::SetError(Some(e.to_string()))
        }
    }
}

pub fn handle_predict(model: &mut Dashboard, ctx: &Context<Dashboard>) -> bool {
    if model.loading || !model.page.runs_inference() {
        return false;
    }
    let Some(file) = model.upload.as_ref().map(|upload| upload.file.clone()) else {
        ctx.link()
            .send_message(Msg::SetError(Some("Upload an OCT image first.".into())));
        return false;
    };

    model.loading = true;
    model.error = None;
    model.result = None;

    let link = ctx.link().clone();
    spawn_local(async move {
        match request_prediction(&file).await {
            Ok(response) => link.send_message(Msg::PredictionReceived(response)),
            Err(message) => link.send_message(Msg::PredictionFailed(message)),
        }
    });
    true
}

pub fn handle_prediction(model: &mut Dashboard, response: PredictionResponse) -> bool {
    model.loading = false;
    if response.disease().is_none() {
        model.result = None;
        model.error = Some(shared::PREDICTION_FAILED_MESSAGE.to_string());
        return true;
    }
    model.result = Some(response);
    model.learn_more_open = false;
    true
}
