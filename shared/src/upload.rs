use derive_more::Display;

/// Image formats the upload widget accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Jpg,
    Jpeg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum UploadError {
    #[display(fmt = "File \"{}\" has no extension. Allowed types: jpg, jpeg, png", _0)]
    MissingExtension(String),
    #[display(fmt = "Unsupported file type \".{}\". Allowed types: jpg, jpeg, png", _0)]
    Unsupported(String),
}

impl std::error::Error for UploadError {}

impl UploadFormat {
    pub const ALL: [UploadFormat; 3] = [UploadFormat::Jpg, UploadFormat::Jpeg, UploadFormat::Png];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" => Some(UploadFormat::Jpg),
            "jpeg" => Some(UploadFormat::Jpeg),
            "png" => Some(UploadFormat::Png),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self, UploadError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| UploadError::MissingExtension(file_name.to_string()))?;

        Self::from_extension(extension).ok_or_else(|| UploadError::Unsupported(extension.to_string()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            UploadFormat::Jpg => "jpg",
            UploadFormat::Jpeg => "jpeg",
            UploadFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            UploadFormat::Jpg | UploadFormat::Jpeg => "image/jpeg",
            UploadFormat::Png => "image/png",
        }
    }

    /// Value for the `accept` attribute of a file input.
    pub fn accept_attribute() -> String {
        Self::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect::<Vec<_>>()
            .join(",")
    }
}
