/// Feed endpoint
///
/// `GET /feed` returns every post, newest first, as seen by the caller:
/// like count, whether the caller liked it, whether the caller owns it, the
/// author's email and the comments oldest first.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use picstream_shared::{
    auth::middleware::AuthContext,
    feed::{assemble_feed, FeedPost},
};
use serde::Serialize;

/// Feed response
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPost>,
}

pub async fn get_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<FeedResponse>> {
    let posts = assemble_feed(&state.db, &auth.user_id).await?;

    tracing::debug!(user_id = %auth.user_id, posts = posts.len(), "Feed assembled");

    Ok(Json(FeedResponse { posts }))
}
