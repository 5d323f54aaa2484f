/// In-memory media store
///
/// Stands in for the hosting service in tests and local development. Every
/// upload reads the file from disk, like the real client, and is recorded so
/// tests can inspect what was sent and check the temporary file is gone
/// afterwards.
///
/// # Example
///
/// ```
/// use picstream_shared::media::{InMemoryMediaStore, MediaStore, UploadRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryMediaStore::new();
/// let file = tempfile::NamedTempFile::new()?;
/// std::fs::write(file.path(), b"fake image")?;
///
/// let uploaded = store.upload(UploadRequest::new(file.path().to_path_buf(), "cat.png")).await?;
/// assert!(uploaded.url.ends_with(".png"));
/// assert_eq!(store.uploads().len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{MediaError, MediaResult, MediaStore, UploadRequest, UploadedMedia};

/// Base URL of files stored in memory
pub const MEMORY_URL_ENDPOINT: &str = "https://media.invalid/picstream";

/// How the store answers the next uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Store the file and answer 200
    Succeed,

    /// Store the file but answer with this status
    Status(u16),

    /// Fail without storing anything
    Fail(String),
}

/// One recorded upload
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Temporary path the caller handed over
    pub path: PathBuf,

    /// Name the client sent
    pub file_name: String,

    /// Name the store assigned
    pub stored_name: String,

    pub content_type: Option<String>,
    pub tags: Vec<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct State {
    behavior: MockBehavior,
    uploads: Vec<RecordedUpload>,
    attempted_paths: Vec<PathBuf>,
}

/// [`MediaStore`] keeping files in memory
#[derive(Debug, Clone)]
pub struct InMemoryMediaStore {
    state: Arc<Mutex<State>>,
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                behavior,
                uploads: Vec::new(),
                attempted_paths: Vec::new(),
            })),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        self.lock().behavior = behavior;
    }

    /// Snapshot of every stored upload
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.lock().uploads.clone()
    }

    /// Path of every upload request, failed ones included
    pub fn attempted_paths(&self) -> Vec<PathBuf> {
        self.lock().attempted_paths.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unique_name(file_name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", file_name, suffix),
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, request: UploadRequest) -> MediaResult<UploadedMedia> {
        let behavior = {
            let mut state = self.lock();
            state.attempted_paths.push(request.path.clone());
            state.behavior.clone()
        };
        if let MockBehavior::Fail(message) = &behavior {
            return Err(MediaError::Request(message.clone()));
        }

        let bytes = tokio::fs::read(&request.path).await?;

        let stored_name = if request.use_unique_file_name {
            unique_name(&request.file_name)
        } else {
            request.file_name.clone()
        };

        let http_status = match behavior {
            MockBehavior::Status(status) => status,
            _ => 200,
        };

        let uploaded = UploadedMedia {
            file_id: uuid::Uuid::new_v4().to_string(),
            name: stored_name.clone(),
            url: format!("{}/{}", MEMORY_URL_ENDPOINT, stored_name),
            file_type: None,
            size: Some(bytes.len() as u64),
            http_status,
        };

        self.lock().uploads.push(RecordedUpload {
            path: request.path,
            file_name: request.file_name,
            stored_name,
            content_type: request.content_type,
            tags: request.tags,
            bytes,
        });

        Ok(uploaded)
    }
}
