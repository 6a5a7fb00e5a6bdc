use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/octlens.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub preprocessing: PreprocessingConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub device: DeviceChoice,
    /// Load the artifact before accepting requests instead of on first use.
    pub preload: bool,
    /// Set when the exported network emits logits rather than probabilities.
    pub apply_softmax: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub image_size: u32,
    pub normalization: Normalization,
    pub layout: TensorLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

/// Pixel transform expected by the trained artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Raw 0-255 values; the network rescales internally (MobileNetV3).
    #[default]
    Identity,
    /// Values divided by 255.
    Unit,
    /// ImageNet mean/std standardisation of 0-1 values.
    Imagenet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    #[default]
    Nchw,
    Nhwc,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let frontend_dir = if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            PathBuf::from(format!("{}/../frontend/dist", manifest_dir))
        } else {
            PathBuf::from("/usr/src/app/frontend/dist")
        };
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            frontend_dir,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/trained_model.pt"),
            device: DeviceChoice::Auto,
            preload: false,
            apply_softmax: false,
        }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            normalization: Normalization::Identity,
            layout: TensorLayout::Nchw,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

macro_rules! keyword_enum {
    ($ty:ty, $key:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    _ => Err(ConfigError::InvalidValue { key: $key, value: s.to_string() }),
                }
            }
        }
    };
}

keyword_enum!(DeviceChoice, "TORCH_DEVICE", {
    "auto" => DeviceChoice::Auto,
    "cpu" => DeviceChoice::Cpu,
    "cuda" => DeviceChoice::Cuda,
});

keyword_enum!(Normalization, "IMAGE_NORMALIZATION", {
    "identity" => Normalization::Identity,
    "unit" => Normalization::Unit,
    "imagenet" => Normalization::Imagenet,
});

keyword_enum!(TensorLayout, "TENSOR_LAYOUT", {
    "nchw" => TensorLayout::Nchw,
    "nhwc" => TensorLayout::Nhwc,
});

impl AppConfig {
    /// Defaults, then the YAML file (if any), then environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match std::env::var("OCTLENS_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(device) = lookup("TORCH_DEVICE") {
            self.model.device = device.parse()?;
        }
        if let Some(preload) = lookup("PRELOAD_MODEL") {
            self.model.preload = parse_bool("PRELOAD_MODEL", &preload)?;
        }
        if let Some(softmax) = lookup("APPLY_SOFTMAX") {
            self.model.apply_softmax = parse_bool("APPLY_SOFTMAX", &softmax)?;
        }
        if let Some(normalization) = lookup("IMAGE_NORMALIZATION") {
            self.preprocessing.normalization = normalization.parse()?;
        }
        if let Some(layout) = lookup("TENSOR_LAYOUT") {
            self.preprocessing.layout = layout.parse()?;
        }
        if let Some(max_bytes) = lookup("MAX_UPLOAD_BYTES") {
            self.upload.max_bytes = parse_number("MAX_UPLOAD_BYTES", &max_bytes)?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_classifier_contract() {
        let config = AppConfig::default();
        assert_eq!(config.preprocessing.image_size, 224);
        assert_eq!(config.preprocessing.normalization, Normalization::Identity);
        assert_eq!(config.server.port, 8081);
        assert!(!config.model.preload);
    }

    #[test]
    fn yaml_file_fills_missing_sections_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "model:\n  path: /srv/models/oct.pt\n  device: cpu\npreprocessing:\n  normalization: imagenet"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("/srv/models/oct.pt"));
        assert_eq!(config.model.device, DeviceChoice::Cpu);
        assert_eq!(config.preprocessing.normalization, Normalization::Imagenet);
        assert_eq!(config.preprocessing.layout, TensorLayout::Nchw);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn malformed_yaml_is_reported_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("MODEL_PATH", "/tmp/model.pt"),
                ("PORT", "9000"),
                ("TENSOR_LAYOUT", "NHWC"),
                ("PRELOAD_MODEL", "true"),
            ]))
            .unwrap();

        assert_eq!(config.model.path, PathBuf::from("/tmp/model.pt"));
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.preprocessing.layout, TensorLayout::Nhwc);
        assert!(config.model.preload);
    }

    #[test]
    fn invalid_override_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("TORCH_DEVICE", "tpu")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TORCH_DEVICE", .. }));

        let err = config
            .apply_overrides(lookup_from(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }
}
