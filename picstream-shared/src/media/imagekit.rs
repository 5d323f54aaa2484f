/// ImageKit upload client
///
/// Uploads go to ImageKit's server-side upload API as a multipart form,
/// authenticated with HTTP basic auth (private key as user name, empty
/// password).
///
/// # Example
///
/// ```no_run
/// use picstream_shared::media::{ImageKitClient, ImageKitConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ImageKitClient::new(ImageKitConfig::new(
///     "private_xxx",
///     "public_xxx",
///     "https://ik.imagekit.io/demo",
/// ))?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{MediaError, MediaResult, MediaStore, UploadRequest, UploadedMedia};

/// Public ImageKit upload endpoint
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";

/// ImageKit credentials and endpoints
#[derive(Clone)]
pub struct ImageKitConfig {
    /// Private API key (used for upload authentication)
    pub private_key: String,

    /// Public API key
    pub public_key: String,

    /// Delivery URL endpoint, e.g. `https://ik.imagekit.io/<id>`
    pub url_endpoint: String,

    /// Upload API URL
    pub upload_url: String,

    /// Request timeout; None waits for as long as the service takes
    pub timeout: Option<Duration>,
}

impl ImageKitConfig {
    pub fn new(
        private_key: impl Into<String>,
        public_key: impl Into<String>,
        url_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: public_key.into(),
            url_endpoint: url_endpoint.into(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for ImageKitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageKitConfig")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("url_endpoint", &self.url_endpoint)
            .field("upload_url", &self.upload_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Body of a successful upload response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponseBody {
    file_id: String,
    name: String,
    url: String,
    #[serde(default)]
    file_type: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

/// ImageKit-backed [`MediaStore`]
#[derive(Debug, Clone)]
pub struct ImageKitClient {
    http: reqwest::Client,
    config: ImageKitConfig,
}

impl ImageKitClient {
    pub fn new(config: ImageKitConfig) -> MediaResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| MediaError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn form(request: UploadRequest, bytes: Vec<u8>) -> MediaResult<Form> {
        let mut part = Part::bytes(bytes).file_name(request.file_name.clone());
        if let Some(content_type) = request.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| MediaError::Request(format!("Invalid content type: {}", e)))?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("fileName", request.file_name)
            .text("useUniqueFileName", request.use_unique_file_name.to_string());

        if !request.tags.is_empty() {
            form = form.text("tags", request.tags.join(","));
        }

        Ok(form)
    }
}

#[async_trait]
impl MediaStore for ImageKitClient {
    fn name(&self) -> &str {
        "imagekit"
    }

    async fn upload(&self, request: UploadRequest) -> MediaResult<UploadedMedia> {
        let bytes = tokio::fs::read(&request.path).await?;
        let size = bytes.len();
        let file_name = request.file_name.clone();

        tracing::debug!(file_name = %file_name, size, "Uploading file to ImageKit");

        let response = self
            .http
            .post(&self.config.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(Self::form(request, bytes)?)
            .send()
            .await
            .map_err(|e| MediaError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                file_name = %file_name,
                status = status.as_u16(),
                "ImageKit rejected upload"
            );
            return Err(MediaError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponseBody = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            file_name = %file_name,
            stored_name = %body.name,
            file_id = %body.file_id,
            "Uploaded file to ImageKit"
        );

        Ok(UploadedMedia {
            file_id: body.file_id,
            name: body.name,
            url: body.url,
            file_type: body.file_type,
            size: body.size,
            http_status: status.as_u16(),
        })
    }
}
