/// Comment model and database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::new_id;

/// Comment row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub user_id: String,
    pub post_id: String,
    pub content: String,
}

impl Comment {
    /// Inserts a new comment
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if the post or user does not exist.
    pub async fn create(pool: &SqlitePool, data: CreateComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, user_id, post_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, post_id, content, created_at
            "#,
        )
        .bind(new_id())
        .bind(data.user_id)
        .bind(data.post_id)
        .bind(data.content)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, user_id, post_id, content, created_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a comment by ID
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
