/// User model and database operations
///
/// Users are created by registration and owned by the identity layer in
/// `auth`. Posts, likes and comments reference them by id and are removed
/// with them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id              TEXT PRIMARY KEY NOT NULL,
///     email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     hashed_password TEXT NOT NULL,
///     is_active       BOOLEAN NOT NULL DEFAULT 1,
///     is_superuser    BOOLEAN NOT NULL DEFAULT 0,
///     is_verified     BOOLEAN NOT NULL DEFAULT 0,
///     created_at      TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use picstream_shared::models::user::{User, CreateUser};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "USER@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::new_id;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4 string)
    pub id: String,

    /// Email address, unique case-insensitively
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Inactive users cannot log in or call authenticated endpoints
    pub is_active: bool,

    /// Superusers can read and delete other accounts
    pub is_superuser: bool,

    /// Set once the email verification flow completes
    pub is_verified: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub hashed_password: String,
}

/// Input for updating an existing user
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UpdateUser {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.is_verified.is_none()
    }
}

const USER_COLUMNS: &str =
    "id, email, hashed_password, is_active, is_superuser, is_verified, created_at";

impl User {
    /// Creates a new active, unverified, non-superuser account
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the email is taken.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, hashed_password, is_active, is_superuser, is_verified, created_at)
            VALUES (?, ?, ?, 1, 0, 0, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(data.email)
        .bind(data.hashed_password)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Returns the updated user, or None if no user has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");

        if let Some(email) = data.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(hashed_password) = data.hashed_password {
            fields
                .push("hashed_password = ")
                .push_bind_unseparated(hashed_password);
        }
        if let Some(is_active) = data.is_active {
            fields.push("is_active = ").push_bind_unseparated(is_active);
        }
        if let Some(is_superuser) = data.is_superuser {
            fields.push("is_superuser = ").push_bind_unseparated(is_superuser);
        }
        if let Some(is_verified) = data.is_verified {
            fields.push("is_verified = ").push_bind_unseparated(is_verified);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(USER_COLUMNS);

        builder
            .build_query_as::<User>()
            .fetch_optional(pool)
            .await
    }

    /// Deletes a user and, through foreign key cascades, their posts, likes
    /// and comments
    ///
    /// Returns true if a user was deleted.
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.is_empty());

        let update = UpdateUser {
            is_verified: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("a@example.com"));
    }
}
