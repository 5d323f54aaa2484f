/// Upload collaborator
///
/// Media files are not stored by Picstream. They are handed to an external
/// hosting service that returns a public URL, and only that URL is persisted.
/// The service sits behind the [`MediaStore`] trait so the API can be wired
/// to ImageKit in production and to an in-memory store in tests.
///
/// # Upload Contract
///
/// Implementations must:
/// 1. Read the file at `UploadRequest::path` (the caller owns and later
///    removes it)
/// 2. Honour `use_unique_file_name` so two uploads never overwrite each other
/// 3. Report the HTTP status the service answered with; the caller only
///    creates a post for a 200
///
/// # Example
///
/// ```no_run
/// use picstream_shared::media::{MediaStore, UploadRequest};
/// use std::path::PathBuf;
///
/// # async fn example(store: &dyn MediaStore) -> Result<(), Box<dyn std::error::Error>> {
/// let uploaded = store
///     .upload(UploadRequest::new(PathBuf::from("/tmp/upload.jpg"), "beach.jpg"))
///     .await?;
/// println!("Public URL: {}", uploaded.url);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod imagekit;
pub mod mock;

pub use imagekit::{ImageKitClient, ImageKitConfig};
pub use mock::InMemoryMediaStore;

/// Tag attached to every upload made by the API server
pub const BACKEND_UPLOAD_TAG: &str = "backend-upload";

/// Upload error types
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Reading the local file failed
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    /// The request never got an HTTP answer
    #[error("Upload request failed: {0}")]
    Request(String),

    /// The service answered with an error status
    #[error("Upload service returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The service answered 2xx with a body we could not decode
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Upload result type alias
pub type MediaResult<T> = Result<T, MediaError>;

/// File to upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local file holding the bytes
    pub path: PathBuf,

    /// Original file name as sent by the client
    pub file_name: String,

    /// MIME type as sent by the client
    pub content_type: Option<String>,

    /// Ask the service to add a random suffix to the stored name
    pub use_unique_file_name: bool,

    /// Tags attached to the stored file
    pub tags: Vec<String>,
}

impl UploadRequest {
    /// Request with a unique stored name and the backend tag
    pub fn new(path: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            path,
            file_name: file_name.into(),
            content_type: None,
            use_unique_file_name: true,
            tags: vec![BACKEND_UPLOAD_TAG.to_string()],
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }
}

/// What the service reports about a stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Service-side file id
    pub file_id: String,

    /// Stored file name (may differ from the uploaded name)
    pub name: String,

    /// Public URL
    pub url: String,

    /// Service's own classification ("image", "non-image", ...)
    pub file_type: Option<String>,

    /// Stored size in bytes
    pub size: Option<u64>,

    /// HTTP status of the upload response
    pub http_status: u16,
}

impl UploadedMedia {
    /// Whether the service answered exactly 200 OK
    pub fn is_ok(&self) -> bool {
        self.http_status == 200
    }
}

/// External media hosting service
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Service name for logs
    fn name(&self) -> &str;

    /// Uploads one file
    async fn upload(&self, request: UploadRequest) -> MediaResult<UploadedMedia>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_defaults() {
        let request = UploadRequest::new(PathBuf::from("/tmp/x.png"), "x.png");
        assert!(request.use_unique_file_name);
        assert_eq!(request.tags, vec![BACKEND_UPLOAD_TAG.to_string()]);
        assert!(request.content_type.is_none());

        let request = request.with_content_type(Some("image/png".to_string()));
        assert_eq!(request.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_uploaded_media_only_200_is_ok() {
        let mut media = UploadedMedia {
            file_id: "f1".to_string(),
            name: "x.png".to_string(),
            url: "https://ik.imagekit.io/demo/x.png".to_string(),
            file_type: Some("image".to_string()),
            size: Some(10),
            http_status: 200,
        };
        assert!(media.is_ok());

        media.http_status = 201;
        assert!(!media.is_ok());
    }
}
