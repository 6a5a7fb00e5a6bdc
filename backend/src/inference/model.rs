use ndarray::Array4;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tch::{CModule, Device, Kind, Tensor};

use super::{Classifier, InferenceError, ModelLoader};
use crate::config::DeviceChoice;

/// TorchScript export of the OCT classifier.
pub struct Model {
    model: Mutex<CModule>,
    device: Device,
}

impl Model {
    pub fn load(model_path: &Path, device: Device) -> Result<Self, InferenceError> {
        let mut module =
            CModule::load_on_device(model_path, device).map_err(|e| InferenceError::ArtifactLoad {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        module.set_eval();
        log::info!("Model {} ready on {:?}", model_path.display(), device);
        Ok(Self {
            model: Mutex::new(module),
            device,
        })
    }
}

impl Classifier for Model {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input
            .as_slice()
            .ok_or_else(|| InferenceError::Preprocess("input tensor is not contiguous".into()))?;
        let tensor = Tensor::from_slice(data)
            .view(shape.as_slice())
            .to_device(self.device);

        let model = self
            .model
            .lock()
            .map_err(|_| InferenceError::Inference("model mutex poisoned".into()))?;
        let output = tch::no_grad(|| model.forward_ts(&[tensor]))?;
        let output_flat = output
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .view([-1]);
        let output_vec = Vec::<f32>::try_from(&output_flat)?;
        Ok(output_vec)
    }
}

pub struct TorchLoader {
    device: Device,
}

impl TorchLoader {
    pub fn new(choice: DeviceChoice) -> Self {
        let device = match choice {
            DeviceChoice::Auto => Device::cuda_if_available(),
            DeviceChoice::Cpu => Device::Cpu,
            DeviceChoice::Cuda => Device::Cuda(0),
        };
        Self { device }
    }
}

impl ModelLoader for TorchLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
        Ok(Arc::new(Model::load(path, self.device)?))
    }
}
