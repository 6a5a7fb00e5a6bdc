use shared::UploadFormat;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Uploaded bytes on disk for the duration of one request. The file is
/// removed when this value is dropped.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn write(bytes: &[u8], format: UploadFormat) -> Result<Self, StagingError> {
        let mut file = tempfile::Builder::new()
            .prefix("octlens-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_follows_upload_format() {
        let staged = StagedUpload::write(b"png bytes", UploadFormat::Png).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "png");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"png bytes");
    }

    #[test]
    fn file_is_removed_on_drop() {
        let staged = StagedUpload::write(b"jpeg bytes", UploadFormat::Jpeg).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn file_is_removed_when_the_owner_panics() {
        let path = std::panic::catch_unwind(|| {
            let staged = StagedUpload::write(b"bytes", UploadFormat::Jpg).unwrap();
            let path = staged.path().to_path_buf();
            std::panic::panic_any(path);
        })
        .unwrap_err()
        .downcast::<std::path::PathBuf>()
        .unwrap();

        assert!(!path.exists());
    }
}
