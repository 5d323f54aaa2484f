/// Like model and database operations
///
/// At most one like exists per (user, post); the `unique_user_post_like`
/// constraint enforces it, and `Like::create` relies on that constraint
/// instead of a separate existence check so concurrent duplicates cannot
/// both succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Like row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Likes a post
    ///
    /// Returns None when the user already likes the post.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        post_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (user_id, post_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING id, user_id, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Removes a user's like from a post
    ///
    /// Returns false if there was nothing to remove.
    pub async fn delete(pool: &SqlitePool, user_id: &str, post_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of likes on a post
    pub async fn count_for_post(pool: &SqlitePool, post_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(pool)
            .await
    }
}
