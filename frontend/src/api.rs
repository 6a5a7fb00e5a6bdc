use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::{ErrorResponse, IMAGE_FIELD, PREDICTION_FAILED_MESSAGE, PredictionResponse};

/// Posts the scan to the backend. The error is a message ready for the
/// error banner.
pub async fn request_prediction(file: &GlooFile) -> Result<PredictionResponse, String> {
    let form_data =
        web_sys::FormData::new().map_err(|_| "Failed to prepare upload.".to_string())?;
    let blob: &gloo_file::Blob = file;
    form_data
        .append_with_blob_and_filename(IMAGE_FIELD, blob.as_ref(), &file.name())
        .map_err(|_| "Failed to prepare upload.".to_string())?;

    let response = Request::post("/api/predict")
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if response.ok() {
        return response
            .json::<PredictionResponse>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e));
    }

    match response.status() {
        // Upload problems carry a message worth showing verbatim.
        400 | 413 | 415 => Err(response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Upload rejected ({})", response.status()))),
        _ => Err(PREDICTION_FAILED_MESSAGE.to_string()),
    }
}
