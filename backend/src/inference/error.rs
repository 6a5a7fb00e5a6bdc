use std::path::PathBuf;

/// Everything that can go wrong between receiving an image path and
/// producing a class index. Callers outside the pipeline only ever show a
/// single failure message; the variants exist for logs.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model artifact not found at {}", .0.display())]
    ArtifactMissing(PathBuf),
    #[error("Failed to load model from {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to prepare input tensor: {0}")]
    Preprocess(String),
    #[error("Model inference error: {0}")]
    Inference(String),
    #[error("Expected {expected} class scores, model returned {actual}")]
    UnexpectedOutput { expected: usize, actual: usize },
    #[error("Model returned non-finite scores")]
    NonFinite,
    #[error("Inference backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl InferenceError {
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::ArtifactMissing(_) => "artifact_missing",
            InferenceError::ArtifactLoad { .. } => "artifact_load",
            InferenceError::Decode(_) => "decode",
            InferenceError::Preprocess(_) => "preprocess",
            InferenceError::Inference(_) => "inference",
            InferenceError::UnexpectedOutput { .. } => "unexpected_output",
            InferenceError::NonFinite => "non_finite",
            InferenceError::BackendUnavailable(_) => "backend_unavailable",
        }
    }
}

#[cfg(feature = "torch")]
impl From<tch::TchError> for InferenceError {
    fn from(err: tch::TchError) -> Self {
        InferenceError::Inference(err.to_string())
    }
}
