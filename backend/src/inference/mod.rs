pub mod error;
pub mod holder;
#[cfg(feature = "torch")]
pub mod model;
pub mod pipeline;
pub mod preprocess;

use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;

use crate::config::ModelConfig;
pub use error::InferenceError;
pub use holder::ModelHolder;
pub use pipeline::{Pipeline, Prediction};

/// A loaded network that maps a preprocessed batch to one score per class.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// Turns an artifact on disk into a [`Classifier`].
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>, InferenceError>;
}

/// Loader used when the crate is built without an inference backend.
pub struct UnavailableLoader;

impl ModelLoader for UnavailableLoader {
    fn load(&self, _path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
        Err(InferenceError::BackendUnavailable(
            "built without the `torch` feature".into(),
        ))
    }
}

pub fn default_loader(config: &ModelConfig) -> Box<dyn ModelLoader> {
    #[cfg(feature = "torch")]
    {
        Box::new(model::TorchLoader::new(config.device))
    }
    #[cfg(not(feature = "torch"))]
    {
        log::warn!(
            "No inference backend compiled in (device preference {:?}); predictions will fail",
            config.device
        );
        Box::new(UnavailableLoader)
    }
}
