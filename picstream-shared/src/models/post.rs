/// Post model and database operations
///
/// A post is one uploaded image or video plus an optional caption. The media
/// itself lives with the upload service; the row keeps its public URL and the
/// name the service assigned to it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id          TEXT PRIMARY KEY NOT NULL,
///     user_id     TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     caption     TEXT,
///     url         TEXT NOT NULL,
///     file_type   TEXT NOT NULL CHECK (file_type IN ('image', 'video')),
///     file_name   TEXT NOT NULL,
///     created_at  TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::new_id;

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Derives the media type from a MIME type
    ///
    /// `video/*` is a video; everything else, including a missing MIME type,
    /// is treated as an image.
    pub fn from_mime(content_type: Option<&str>) -> Self {
        match content_type {
            Some(mime) if mime.trim().to_ascii_lowercase().starts_with("video/") => {
                MediaType::Video
            }
            _ => MediaType::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// Post row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    /// Unique post ID (UUID v4 string)
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Optional caption
    pub caption: Option<String>,

    /// Public URL returned by the upload service
    pub url: String,

    /// Image or video
    pub file_type: MediaType,

    /// File name assigned by the upload service
    pub file_name: String,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub user_id: String,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: MediaType,
    pub file_name: String,
}

impl Post {
    /// Inserts a new post
    pub async fn create(pool: &SqlitePool, data: CreatePost) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, user_id, caption, url, file_type, file_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, caption, url, file_type, file_name, created_at
            "#,
        )
        .bind(new_id())
        .bind(data.user_id)
        .bind(data.caption)
        .bind(data.url)
        .bind(data.file_type)
        .bind(data.file_name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Finds a post by ID
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, caption, url, file_type, file_name, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether a post exists
    pub async fn exists(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Deletes a post together with its likes and comments
    ///
    /// All three deletes run in one transaction, so either the post and every
    /// dependent row are gone or nothing changed. Returns false if the post
    /// did not exist.
    pub async fn delete_with_dependents(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let likes = sqlx::query("DELETE FROM likes WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        tracing::debug!(post_id = %id, likes, comments, "Deleted post with dependents");
        Ok(true)
    }
}
