/// Comment endpoints
///
/// - `POST /posts/:id/comments` - Comment on a post (form field `content`)
/// - `DELETE /comments/:id` - Delete own comment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::FormFields,
    routes::{auth::SuccessResponse, parse_id},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use picstream_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    models::{
        comment::{Comment, CreateComment},
        post::Post,
    },
};
use serde::{Deserialize, Serialize};

/// Comment as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentRead {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: CommentRead,
}

/// Adds a comment
///
/// # Errors
///
/// - `400 Bad Request`: Malformed post id
/// - `404 Not Found`: No such post
/// - `422 Unprocessable Entity`: Missing or blank `content`
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    fields: FormFields,
) -> ApiResult<Json<CommentResponse>> {
    let post_id = parse_id(&id, "post")?;

    let content = fields
        .non_blank("content")
        .ok_or_else(|| ApiError::invalid_field("content", "Comment content cannot be empty"))?
        .to_string();

    if !Post::exists(&state.db, &post_id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let comment = Comment::create(
        &state.db,
        CreateComment {
            user_id: auth.user_id.clone(),
            post_id,
            content,
        },
    )
    .await?;

    tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment added");

    Ok(Json(CommentResponse {
        success: true,
        comment: CommentRead {
            id: comment.id,
            user_id: comment.user_id,
            content: comment.content,
            email: auth.email,
            created_at: comment.created_at,
        },
    }))
}

/// Deletes a comment
///
/// # Errors
///
/// - `400 Bad Request`: Malformed comment id
/// - `403 Forbidden`: Not the author
/// - `404 Not Found`: No such comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "comment")?;

    let comment = Comment::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    require_owner(&auth, &comment.user_id)?;

    if !Comment::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    tracing::debug!(comment_id = %id, user_id = %auth.user_id, "Comment deleted");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Comment deleted".to_string(),
    }))
}
