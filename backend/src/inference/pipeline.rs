use shared::{DiseaseClass, PREDICTION_FAILED};
use std::path::Path;
use std::sync::Arc;

use super::{InferenceError, ModelHolder, preprocess};
use crate::config::PreprocessingConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class: DiseaseClass,
    pub scores: Vec<f32>,
}

impl Prediction {
    /// Arg-max over the network output. Ties resolve to the lowest index.
    pub fn from_scores(scores: Vec<f32>, apply_softmax: bool) -> Result<Self, InferenceError> {
        if scores.len() != DiseaseClass::ALL.len() {
            return Err(InferenceError::UnexpectedOutput {
                expected: DiseaseClass::ALL.len(),
                actual: scores.len(),
            });
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::NonFinite);
        }

        let scores = if apply_softmax { softmax(&scores) } else { scores };
        let best = scores
            .iter()
            .enumerate()
            .fold(0, |best, (i, &s)| if s > scores[best] { i } else { best });
        let class = DiseaseClass::from_index(best as i64).ok_or(InferenceError::UnexpectedOutput {
            expected: DiseaseClass::ALL.len(),
            actual: scores.len(),
        })?;

        Ok(Self { class, scores })
    }

    pub fn class_index(&self) -> i32 {
        self.class.index() as i32
    }

    pub fn confidence(&self) -> f32 {
        self.scores[self.class.index()]
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Path in, class out: obtain model, decode and resize, forward pass, arg-max.
#[derive(Clone)]
pub struct Pipeline {
    holder: Arc<ModelHolder>,
    preprocessing: PreprocessingConfig,
    apply_softmax: bool,
}

impl Pipeline {
    pub fn new(holder: Arc<ModelHolder>, preprocessing: PreprocessingConfig, apply_softmax: bool) -> Self {
        Self {
            holder,
            preprocessing,
            apply_softmax,
        }
    }

    pub fn holder(&self) -> &ModelHolder {
        &self.holder
    }

    pub fn run(&self, image_path: &Path) -> Result<Prediction, InferenceError> {
        let model = self.holder.get()?;
        let input = preprocess::load_and_prepare(image_path, &self.preprocessing)?;
        let scores = model.classify(&input)?;
        Prediction::from_scores(scores, self.apply_softmax)
    }

    /// Class index for the image at `image_path`, or [`PREDICTION_FAILED`].
    pub fn model_prediction(&self, image_path: &Path) -> i32 {
        match self.run(image_path) {
            Ok(prediction) => prediction.class_index(),
            Err(e) => {
                log::error!(
                    "Prediction failed for {} ({}): {}",
                    image_path.display(),
                    e.kind(),
                    e
                );
                PREDICTION_FAILED
            }
        }
    }
}
