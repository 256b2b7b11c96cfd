//! Image upload service.
//!
//! Only JPEG, PNG, WebP and GIF are accepted, judged by the declared content
//! type. Files are stored under `uploads/<uuid><ext>`.

use std::path::Path;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use super::ServiceError;
use crate::storage::ObjectStore;

/// Message returned for anything that is not an accepted image type.
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed.";

/// Accepted content types and the extension used when the filename has none.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/webp", ".webp"),
    ("image/gif", ".gif"),
];

/// Extensions kept from the original filename.
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Upload service.
pub struct UploadService<'a> {
    images: &'a Arc<dyn ObjectStore>,
}

impl<'a> UploadService<'a> {
    /// Create a new upload service.
    #[must_use]
    pub const fn new(images: &'a Arc<dyn ObjectStore>) -> Self {
        Self { images }
    }

    /// Validate and store an image, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for unsupported types or empty
    /// files and `ServiceError::Storage` if the backend fails.
    #[instrument(skip(self, file), fields(file_name = ?file.file_name, size = file.bytes.len()))]
    pub async fn upload(&self, file: UploadedFile) -> Result<String, ServiceError> {
        let content_type = file
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .ok_or_else(|| ServiceError::validation(INVALID_FILE_TYPE))?;

        let Some(mime_extension) = ALLOWED_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == content_type)
            .map(|(_, ext)| *ext)
        else {
            return Err(ServiceError::validation(INVALID_FILE_TYPE));
        };

        if file.bytes.is_empty() {
            return Err(ServiceError::validation("Uploaded file is empty"));
        }

        let extension = file
            .file_name
            .as_deref()
            .and_then(known_extension)
            .unwrap_or_else(|| mime_extension.to_string());
        let key = format!("uploads/{}{extension}", Uuid::new_v4());

        let url = self.images.put(&key, file.bytes, &content_type).await?;
        tracing::info!(url, backend = self.images.backend(), "Image uploaded");
        Ok(url)
    }
}

/// Lowercased `.ext` from a filename, if it is a known image extension.
fn known_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    KNOWN_EXTENSIONS
        .contains(&ext.as_str())
        .then(|| format!(".{ext}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::storage::MemoryObjectStore;

    use super::*;

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: Some(content_type.to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn test_png_is_stored_under_uploads() {
        let memory = Arc::new(MemoryObjectStore::new());
        let images: Arc<dyn ObjectStore> = memory.clone();

        let url = UploadService::new(&images)
            .upload(file("Boot Front.PNG", "image/png"))
            .await
            .unwrap();

        assert!(url.contains("/uploads/"));
        assert!(url.ends_with(".png"));
        let (bytes, content_type) = memory.get(&url).await.unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_bmp_is_rejected() {
        let images: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let err = UploadService::new(&images)
            .upload(file("boot.bmp", "image/bmp"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_FILE_TYPE);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let images: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let mut upload = file("boot.png", "image/png");
        upload.content_type = None;
        assert!(UploadService::new(&images).upload(upload).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let images: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let mut upload = file("boot.png", "image/png");
        upload.bytes.clear();
        let err = UploadService::new(&images).upload(upload).await.unwrap_err();
        assert_eq!(err.to_string(), "Uploaded file is empty");
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(known_extension("photo.JPEG").as_deref(), Some(".jpeg"));
        assert_eq!(known_extension("photo"), None);
        assert_eq!(known_extension("photo.exe"), None);
    }
}
