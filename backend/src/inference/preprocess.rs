use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use ndarray::Array4;
use std::path::Path;

use super::error::InferenceError;
use crate::config::{Normalization, PreprocessingConfig, TensorLayout};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decodes the file at `path` and turns it into a batch of one.
pub fn load_and_prepare(
    path: &Path,
    config: &PreprocessingConfig,
) -> Result<Array4<f32>, InferenceError> {
    // Content decides the codec; the staged suffix only reflects the upload name.
    let image = ImageReader::open(path)
        .map_err(image::ImageError::IoError)?
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;
    prepare(&image, config)
}

pub fn prepare(
    image: &DynamicImage,
    config: &PreprocessingConfig,
) -> Result<Array4<f32>, InferenceError> {
    let size = config.image_size;
    if size == 0 {
        return Err(InferenceError::Preprocess("image_size must be positive".into()));
    }

    let rgb = image.resize_exact(size, size, FilterType::Nearest).to_rgb8();
    let side = size as usize;
    let shape = match config.layout {
        TensorLayout::Nchw => (1, 3, side, side),
        TensorLayout::Nhwc => (1, side, side, 3),
    };

    let mut input = Array4::<f32>::zeros(shape);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for channel in 0..3 {
            let value = normalize(config.normalization, channel, f32::from(pixel[channel]));
            match config.layout {
                TensorLayout::Nchw => input[[0, channel, y, x]] = value,
                TensorLayout::Nhwc => input[[0, y, x, channel]] = value,
            }
        }
    }
    Ok(input)
}

fn normalize(normalization: Normalization, channel: usize, value: f32) -> f32 {
    match normalization {
        Normalization::Identity => value,
        Normalization::Unit => value / 255.0,
        Normalization::Imagenet => (value / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
    }
}
