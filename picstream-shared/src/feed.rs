/// Feed assembly
///
/// The feed is every post, newest first, annotated for the requesting user:
/// like count, whether they liked it, whether they own it, the author's email,
/// and the post's comments oldest first with each commenter's email.
///
/// Assembly costs two queries no matter how many posts exist: one grouped
/// join for posts, authors and likes, and one join for all comments and their
/// authors, which are then bucketed by post id in memory.
///
/// # Example
///
/// ```no_run
/// use picstream_shared::feed::assemble_feed;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, viewer_id: &str) -> Result<(), sqlx::Error> {
/// let posts = assemble_feed(&pool, viewer_id).await?;
/// for post in &posts {
///     println!("{} has {} likes", post.id, post.like_count);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::models::post::MediaType;

/// Shown in place of an author whose account no longer resolves
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One post in the feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: String,
    pub user_id: String,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: MediaType,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub is_owner: bool,
    pub email: String,
    pub like_count: i64,
    pub is_liked: bool,
    pub comments: Vec<FeedComment>,
}

/// One comment under a feed post
#[derive(Debug, Clone, Serialize)]
pub struct FeedComment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct FeedPostRow {
    id: String,
    user_id: String,
    caption: Option<String>,
    url: String,
    file_type: MediaType,
    file_name: String,
    created_at: DateTime<Utc>,
    author_email: Option<String>,
    like_count: i64,
    liked_by_viewer: i64,
}

#[derive(sqlx::FromRow)]
struct FeedCommentRow {
    id: String,
    user_id: String,
    post_id: String,
    content: String,
    created_at: DateTime<Utc>,
    author_email: Option<String>,
}

/// Builds the full feed as seen by `viewer_id`
pub async fn assemble_feed(
    pool: &SqlitePool,
    viewer_id: &str,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let post_rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.user_id, p.caption, p.url, p.file_type, p.file_name, p.created_at,
               u.email AS author_email,
               COUNT(l.id) AS like_count,
               COALESCE(MAX(l.user_id = ?), 0) AS liked_by_viewer
        FROM posts p
        LEFT JOIN users u ON u.id = p.user_id
        LEFT JOIN likes l ON l.post_id = p.id
        GROUP BY p.id
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    if post_rows.is_empty() {
        return Ok(Vec::new());
    }

    let comment_rows = sqlx::query_as::<_, FeedCommentRow>(
        r#"
        SELECT c.id, c.user_id, c.post_id, c.content, c.created_at,
               u.email AS author_email
        FROM comments c
        LEFT JOIN users u ON u.id = c.user_id
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut comments_by_post: HashMap<String, Vec<FeedComment>> = HashMap::new();
    for row in comment_rows {
        comments_by_post
            .entry(row.post_id)
            .or_default()
            .push(FeedComment {
                id: row.id,
                user_id: row.user_id,
                content: row.content,
                email: row.author_email.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                created_at: row.created_at,
            });
    }

    let posts = post_rows
        .into_iter()
        .map(|row| {
            let comments = comments_by_post.remove(&row.id).unwrap_or_default();
            FeedPost {
                is_owner: row.user_id == viewer_id,
                email: row.author_email.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                like_count: row.like_count,
                is_liked: row.liked_by_viewer != 0,
                comments,
                id: row.id,
                user_id: row.user_id,
                caption: row.caption,
                url: row.url,
                file_type: row.file_type,
                file_name: row.file_name,
                created_at: row.created_at,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        viewer_id = %viewer_id,
        posts = posts.len(),
        "Assembled feed"
    );

    Ok(posts)
}
