use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use futures::TryStreamExt;
use log::{error, info, warn};
use serde_json::json;
use sha2::{Digest, Sha256};
use shared::{
    ErrorResponse, IMAGE_FIELD, PredictionFailure, PredictionResponse, ReloadRequest, UploadError,
    UploadFormat,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::inference::{InferenceError, Pipeline};
use crate::staging::{StagedUpload, StagingError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image uploaded; expected a multipart field named \"image\"")]
    MissingImage,
    #[error("Uploaded image is empty")]
    EmptyImage,
    #[error("Uploaded image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("{0}")]
    Unsupported(#[from] UploadError),
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Prediction(#[from] InferenceError),
    #[error("Malformed reload request: {0}")]
    InvalidReload(String),
    #[error("Failed to reload model: {0}")]
    Reload(InferenceError),
    #[error("Inference worker unavailable")]
    Blocking,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage
            | ApiError::EmptyImage
            | ApiError::Multipart(_)
            | ApiError::InvalidReload(_) => StatusCode::BAD_REQUEST,
            ApiError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unsupported(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Staging(_)
            | ApiError::Prediction(_)
            | ApiError::Reload(_)
            | ApiError::Blocking => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            // Callers only learn that the prediction failed; the log has the cause.
            ApiError::Staging(_) | ApiError::Prediction(_) | ApiError::Blocking => {
                response.json(PredictionFailure::default())
            }
            other => response.json(ErrorResponse {
                error: other.to_string(),
            }),
        }
    }
}

struct Upload {
    bytes: Vec<u8>,
    format: UploadFormat,
    file_name: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/predict", web::post().to(handle_predict))
            .route("/model", web::get().to(model_status))
            .route("/model/reload", web::post().to(reload_model))
            .route("/health", web::get().to(health)),
    );
}

async fn handle_predict(
    pipeline: web::Data<Pipeline>,
    limits: web::Data<UploadConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(&mut payload, limits.max_bytes).await?;
    let request_id = Uuid::new_v4();
    let image_sha256 = hex::encode(Sha256::digest(&upload.bytes));
    info!(
        "Prediction {} received {} ({} bytes, sha256 {})",
        request_id,
        upload.file_name,
        upload.bytes.len(),
        &image_sha256[..12]
    );

    let started = Instant::now();
    let pipeline = pipeline.into_inner();
    let outcome = web::block(move || -> Result<_, ApiError> {
        // Dropped at the end of this closure whether or not the pipeline succeeds.
        let staged = StagedUpload::write(&upload.bytes, upload.format)?;
        Ok(pipeline.run(staged.path())?)
    })
    .await
    .map_err(|_| ApiError::Blocking)?;

    let prediction = match outcome {
        Ok(prediction) => prediction,
        Err(e) => {
            match &e {
                ApiError::Prediction(cause) => error!(
                    "Prediction {} failed ({}): {}",
                    request_id,
                    cause.kind(),
                    cause
                ),
                other => error!("Prediction {} failed: {}", request_id, other),
            }
            return Err(e);
        }
    };

    info!(
        "Prediction {} -> {} ({:.3}) in {} ms",
        request_id,
        prediction.class,
        prediction.confidence(),
        started.elapsed().as_millis()
    );

    Ok(HttpResponse::Ok().json(PredictionResponse {
        request_id,
        class_index: prediction.class_index(),
        label: prediction.class.label().to_string(),
        confidence: prediction.confidence(),
        predictions: prediction.scores,
        image_sha256,
        analyzed_at: Utc::now(),
    }))
}

/// Reads the first `image` field. Other fields are skipped.
async fn read_upload(payload: &mut Multipart, max_bytes: usize) -> Result<Upload, ApiError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            while field
                .try_next()
                .await
                .map_err(|e| ApiError::Multipart(e.to_string()))?
                .is_some()
            {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let format = upload_format(&field, &file_name)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                warn!("Rejected upload {} over {} bytes", file_name, max_bytes);
                return Err(ApiError::TooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(ApiError::EmptyImage);
        }
        return Ok(Upload {
            bytes,
            format,
            file_name,
        });
    }
    Err(ApiError::MissingImage)
}

/// Format from the file name, falling back to the part's content type when
/// the client sent no name.
fn upload_format(field: &Field, file_name: &str) -> Result<UploadFormat, ApiError> {
    if !file_name.is_empty() {
        return UploadFormat::from_file_name(file_name).map_err(|e| {
            warn!("Rejected upload: {}", e);
            ApiError::Unsupported(e)
        });
    }

    let essence = field.content_type().map(|mime| mime.essence_str());
    UploadFormat::ALL
        .into_iter()
        .find(|format| essence == Some(format.mime_type()))
        .ok_or_else(|| ApiError::Unsupported(UploadError::MissingExtension("upload".to_string())))
}

async fn model_status(pipeline: web::Data<Pipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.holder().status())
}

async fn reload_model(
    pipeline: web::Data<Pipeline>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    // An empty body reloads the configured artifact.
    let request = if body.is_empty() {
        ReloadRequest::default()
    } else {
        serde_json::from_slice::<ReloadRequest>(&body)
            .map_err(|e| ApiError::InvalidReload(e.to_string()))?
    };

    let pipeline = pipeline.into_inner();
    let reloaded = web::block({
        let pipeline = pipeline.clone();
        move || pipeline.holder().reload(request.path.as_deref().map(Path::new))
    })
    .await
    .map_err(|_| ApiError::Blocking)?;

    if let Err(e) = reloaded {
        error!("Model reload failed ({}): {}", e.kind(), e);
        return Err(ApiError::Reload(e));
    }
    Ok(HttpResponse::Ok().json(pipeline.holder().status()))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessingConfig;
    use crate::inference::ModelHolder;
    use crate::inference::testing::StubLoader;
    use actix_web::http::header;
    use actix_web::{App, test};
    use image::{Rgb, RgbImage};
    use shared::{ModelStatus, PREDICTION_FAILED, PREDICTION_FAILED_MESSAGE};
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    const BOUNDARY: &str = "octlens-test-boundary";

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(64, 48, Rgb([30, 60, 90]))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart(field: &str, file_name: &str, content: &[u8]) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap();
        body.extend_from_slice(content);
        write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }

    struct Harness {
        pipeline: Pipeline,
        loads: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    fn harness(scores: Vec<f32>, artifact: &Path) -> Harness {
        let loader = StubLoader::new(scores);
        let loads = loader.loads.clone();
        let calls = loader.calls.clone();
        let holder = Arc::new(ModelHolder::new(artifact, Box::new(loader)));
        Harness {
            pipeline: Pipeline::new(holder, PreprocessingConfig::default(), false),
            loads,
            calls,
        }
    }

    macro_rules! app {
        ($pipeline:expr, $max_bytes:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pipeline))
                    .app_data(web::Data::new(UploadConfig {
                        max_bytes: $max_bytes,
                    }))
                    .configure(configure_api),
            )
            .await
        };
    }

    fn predict_request(field: &str, file_name: &str, content: &[u8]) -> test::TestRequest {
        let (content_type, body) = multipart(field, file_name, content);
        test::TestRequest::post()
            .uri("/api/predict")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn predicts_label_for_valid_scan() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.1, 0.6, 0.2, 0.1], artifact.path());
        let app = app!(h.pipeline, 1024 * 1024);

        let req = predict_request("image", "scan.png", &png_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.class_index, 1);
        assert_eq!(body.label, "DME");
        assert_eq!(body.predictions.len(), 4);
        assert!((body.confidence - 0.6).abs() < f32::EPSILON);
        assert_eq!(body.image_sha256.len(), 64);
    }

    #[actix_web::test]
    async fn same_scan_twice_gives_same_class_with_one_load() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.9, 0.05, 0.03, 0.02], artifact.path());
        let loads = h.loads.clone();
        let app = app!(h.pipeline, 1024 * 1024);

        let mut indices = Vec::new();
        for _ in 0..2 {
            let req = predict_request("image", "scan.jpg", &png_bytes()).to_request();
            let resp = test::call_service(&app, req).await;
            let body: PredictionResponse = test::read_body_json(resp).await;
            indices.push(body.class_index);
        }
        assert_eq!(indices, [0, 0]);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn unsupported_extension_never_reaches_pipeline() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let (loads, calls) = (h.loads.clone(), h.calls.clone());
        let app = app!(h.pipeline, 1024 * 1024);

        let req = predict_request("image", "scan.gif", &png_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.contains(".gif"));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn undecodable_image_reports_generic_failure() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let calls = h.calls.clone();
        let app = app!(h.pipeline, 1024 * 1024);

        let req = predict_request("image", "scan.jpg", b"garbage").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: PredictionFailure = test::read_body_json(resp).await;
        assert_eq!(body.class_index, PREDICTION_FAILED);
        assert_eq!(body.error, PREDICTION_FAILED_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn missing_model_reports_generic_failure() {
        let h = harness(vec![0.25; 4], Path::new("/nonexistent/trained_model.pt"));
        let app = app!(h.pipeline, 1024 * 1024);

        let req = predict_request("image", "scan.png", &png_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: PredictionFailure = test::read_body_json(resp).await;
        assert_eq!(body, PredictionFailure::default());
    }

    #[actix_web::test]
    async fn rejects_missing_empty_and_oversized_uploads() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let app = app!(h.pipeline, 32);

        let req = predict_request("document", "scan.png", b"x").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = predict_request("image", "scan.png", b"").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = predict_request("image", "scan.png", &png_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn reload_switches_artifact_and_reports_status() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], first.path());
        let loads = h.loads.clone();
        let app = app!(h.pipeline, 1024);

        let req = test::TestRequest::get().uri("/api/model").to_request();
        let status: ModelStatus = test::call_and_read_body_json(&app, req).await;
        assert!(!status.loaded);

        let req = test::TestRequest::post()
            .uri("/api/model/reload")
            .set_json(ReloadRequest {
                path: Some(second.path().display().to_string()),
            })
            .to_request();
        let status: ModelStatus = test::call_and_read_body_json(&app, req).await;
        assert!(status.loaded);
        assert_eq!(status.path, second.path().display().to_string());

        let req = test::TestRequest::post().uri("/api/model/reload").to_request();
        let status: ModelStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status.load_count, 2);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn reload_of_missing_artifact_fails() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let app = app!(h.pipeline, 1024);

        let req = test::TestRequest::post()
            .uri("/api/model/reload")
            .set_json(ReloadRequest {
                path: Some("/nonexistent/model.pt".into()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Failed to reload model"));
    }

    #[actix_web::test]
    async fn failed_reload_keeps_serving_previous_model() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.1, 0.1, 0.7, 0.1], artifact.path());
        let app = app!(h.pipeline, 1024 * 1024);

        let req = predict_request("image", "scan.png", &png_bytes()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/model/reload")
            .set_json(ReloadRequest {
                path: Some("/nonexistent/x.pt".into()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = predict_request("image", "scan.png", &png_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.label, "DRUSEN");

        let req = test::TestRequest::get().uri("/api/model").to_request();
        let status: ModelStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status.path, artifact.path().display().to_string());
        assert_eq!(status.load_count, 1);
    }

    #[actix_web::test]
    async fn malformed_reload_body_is_rejected() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let loads = h.loads.clone();
        let app = app!(h.pipeline, 1024);

        let req = test::TestRequest::post()
            .uri("/api/model/reload")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{\"path\": 42")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Malformed reload request"));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn unnamed_upload_falls_back_to_content_type() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.1, 0.1, 0.1, 0.7], artifact.path());
        let app = app!(h.pipeline, 1024 * 1024);

        let mut body = Vec::new();
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .unwrap();
        body.extend_from_slice(&png_bytes());
        write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.label, "NORMAL");
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let artifact = NamedTempFile::new().unwrap();
        let h = harness(vec![0.25; 4], artifact.path());
        let app = app!(h.pipeline, 1024);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
