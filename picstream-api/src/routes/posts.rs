/// Post endpoints
///
/// - `POST /upload` - Upload an image or video and create a post
/// - `DELETE /posts/:id` - Delete own post with its likes and comments

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::SuccessResponse, parse_id},
};
use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use picstream_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    media::UploadRequest,
    models::post::{CreatePost, MediaType, Post},
};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// File part of an upload form
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    temp: NamedTempFile,
}

/// Temporary file keeping the original extension
///
/// Removed when dropped.
fn temp_file_for(file_name: &str) -> std::io::Result<NamedTempFile> {
    let suffix = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    tempfile::Builder::new()
        .prefix("picstream-upload-")
        .suffix(&suffix)
        .tempfile()
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(err.body_text())
}

fn temp_file_error(err: std::io::Error) -> ApiError {
    ApiError::InternalError(format!("Temp file: {}", err))
}

/// Upload handler
///
/// Multipart body with a required `file` part and an optional `caption`.
/// The file is streamed into a temporary file, handed to the media store, and
/// a post is created only when the store answers 200.
///
/// # Errors
///
/// - `400 Bad Request`: No `file` part
/// - `500 Internal Server Error`: The upload failed or was not answered
///   with 200, or the post could not be saved
pub async fn upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<Post>> {
    let mut file: Option<UploadedFile> = None;
    let mut caption: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);

                let temp = temp_file_for(&file_name).map_err(temp_file_error)?;
                let mut out = tokio::fs::File::create(temp.path())
                    .await
                    .map_err(temp_file_error)?;
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    out.write_all(&chunk).await.map_err(temp_file_error)?;
                }
                out.flush().await.map_err(temp_file_error)?;

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    temp,
                });
            }
            Some("caption") => {
                let text = field.text().await.map_err(multipart_error)?;
                caption = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let caption = caption
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let request = UploadRequest::new(file.temp.path().to_path_buf(), file.file_name.clone())
        .with_content_type(file.content_type.clone());

    let uploaded = state.media.upload(request).await?;
    if !uploaded.is_ok() {
        return Err(ApiError::InternalError(format!(
            "{} answered upload with status {}",
            state.media.name(),
            uploaded.http_status
        )));
    }

    let post = Post::create(
        &state.db,
        CreatePost {
            user_id: auth.user_id.clone(),
            caption,
            url: uploaded.url,
            file_type: MediaType::from_mime(file.content_type.as_deref()),
            file_name: uploaded.name,
        },
    )
    .await?;

    tracing::info!(
        post_id = %post.id,
        user_id = %auth.user_id,
        file_type = post.file_type.as_str(),
        "Post created"
    );

    Ok(Json(post))
}

/// Deletes a post with its likes and comments
///
/// # Errors
///
/// - `400 Bad Request`: Malformed post id
/// - `403 Forbidden`: Not the author
/// - `404 Not Found`: No such post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "post")?;

    let post = Post::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    require_owner(&auth, &post.user_id)?;

    if !Post::delete_with_dependents(&state.db, &id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    tracing::info!(post_id = %id, user_id = %auth.user_id, "Post deleted");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}
