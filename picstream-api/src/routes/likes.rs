/// Like endpoints
///
/// - `POST /posts/:id/like` - Like a post
/// - `DELETE /posts/:id/like` - Remove own like
///
/// Both answer with the post's like count after the change. A user likes a
/// post at most once; the database enforces it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_id,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use picstream_shared::{
    auth::middleware::AuthContext,
    models::{like::Like, post::Post},
};
use serde::{Deserialize, Serialize};

/// Like count after a like or unlike
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub like_count: i64,
}

async fn ensure_post_exists(state: &AppState, post_id: &str) -> ApiResult<()> {
    if Post::exists(&state.db, post_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Post not found".to_string()))
    }
}

/// Likes a post
///
/// # Errors
///
/// - `400 Bad Request`: Malformed post id
/// - `404 Not Found`: No such post
/// - `409 Conflict`: Already liked
pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    let post_id = parse_id(&id, "post")?;
    ensure_post_exists(&state, &post_id).await?;

    if Like::create(&state.db, &auth.user_id, &post_id).await?.is_none() {
        return Err(ApiError::Conflict("Post already liked".to_string()));
    }

    let like_count = Like::count_for_post(&state.db, &post_id).await?;

    tracing::debug!(post_id = %post_id, user_id = %auth.user_id, like_count, "Post liked");

    Ok(Json(LikeResponse {
        success: true,
        like_count,
    }))
}

/// Removes the caller's like
///
/// # Errors
///
/// - `400 Bad Request`: Malformed post id
/// - `404 Not Found`: No such post, or the caller does not like it
pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    let post_id = parse_id(&id, "post")?;
    ensure_post_exists(&state, &post_id).await?;

    if !Like::delete(&state.db, &auth.user_id, &post_id).await? {
        return Err(ApiError::NotFound("Like not found".to_string()));
    }

    let like_count = Like::count_for_post(&state.db, &post_id).await?;

    tracing::debug!(post_id = %post_id, user_id = %auth.user_id, like_count, "Post unliked");

    Ok(Json(LikeResponse {
        success: true,
        like_count,
    }))
}
