use shared::ModelStatus;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Classifier, InferenceError, ModelLoader};

/// Process-wide owner of the loaded artifact. The first `get` loads it; later
/// calls share the same instance until a successful `reload`.
pub struct ModelHolder {
    loader: Box<dyn ModelLoader>,
    state: Mutex<HolderState>,
}

struct HolderState {
    path: PathBuf,
    model: Option<Arc<dyn Classifier>>,
    load_count: u64,
}

impl ModelHolder {
    pub fn new(path: impl Into<PathBuf>, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            state: Mutex::new(HolderState {
                path: path.into(),
                model: None,
                load_count: 0,
            }),
        }
    }

    pub fn get(&self) -> Result<Arc<dyn Classifier>, InferenceError> {
        let mut state = self.lock();
        if let Some(model) = &state.model {
            return Ok(model.clone());
        }

        if !state.path.is_file() {
            return Err(InferenceError::ArtifactMissing(state.path.clone()));
        }

        log::info!("Loading model artifact from {}", state.path.display());
        let model = self.loader.load(&state.path)?;
        state.load_count += 1;
        state.model = Some(model.clone());
        Ok(model)
    }

    /// Loads the artifact at `path` (or the configured one) and swaps it in.
    /// On failure the previous path and model stay in place.
    pub fn reload(&self, path: Option<&Path>) -> Result<(), InferenceError> {
        let mut state = self.lock();
        let target = path.map_or_else(|| state.path.clone(), Path::to_path_buf);
        if !target.is_file() {
            return Err(InferenceError::ArtifactMissing(target));
        }

        log::info!("Reloading model artifact from {}", target.display());
        let model = self.loader.load(&target)?;
        if state.path != target {
            log::info!(
                "Model path changed from {} to {}",
                state.path.display(),
                target.display()
            );
        }
        state.path = target;
        state.model = Some(model);
        state.load_count += 1;
        Ok(())
    }

    pub fn status(&self) -> ModelStatus {
        let state = self.lock();
        ModelStatus {
            path: state.path.display().to_string(),
            loaded: state.model.is_some(),
            load_count: state.load_count,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HolderState> {
        // State is only mutated after a successful load, so a poisoned lock is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
