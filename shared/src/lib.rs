//! Types shared between the OCTLens backend and the yew frontend.

pub mod classes;
pub mod pages;
pub mod upload;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use classes::{Caption, DiseaseClass, Recommendation};
pub use pages::Page;
pub use upload::{UploadError, UploadFormat};

/// Class index reported when a prediction could not be produced.
pub const PREDICTION_FAILED: i32 = -1;

pub const PREDICTION_FAILED_MESSAGE: &str = "Prediction failed. Please check the image or model.";

/// Multipart field carrying the uploaded scan.
pub const IMAGE_FIELD: &str = "image";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub class_index: i32,
    pub label: String,
    pub predictions: Vec<f32>,
    pub confidence: f32,
    pub image_sha256: String,
    pub analyzed_at: DateTime<Utc>,
}

impl PredictionResponse {
    pub fn disease(&self) -> Option<DiseaseClass> {
        DiseaseClass::from_index(i64::from(self.class_index))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionFailure {
    pub error: String,
    pub class_index: i32,
}

impl Default for PredictionFailure {
    fn default() -> Self {
        Self {
            error: PREDICTION_FAILED_MESSAGE.to_string(),
            class_index: PREDICTION_FAILED,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelStatus {
    pub path: String,
    pub loaded: bool,
    pub load_count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReloadRequest {
    pub path: Option<String>,
}
