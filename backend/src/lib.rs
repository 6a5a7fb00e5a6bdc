pub mod config;
pub mod inference;
pub mod routes;
pub mod staging;

use std::sync::Arc;

use config::AppConfig;
use inference::{ModelHolder, Pipeline, default_loader};

/// Builds the prediction pipeline described by `config`. The model itself is
/// loaded on first use.
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
    let holder = ModelHolder::new(config.model.path.clone(), default_loader(&config.model));
    Pipeline::new(
        Arc::new(holder),
        config.preprocessing.clone(),
        config.model.apply_softmax,
    )
}
