/// Database models for Picstream
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `user`: Accounts managed by the identity layer
/// - `post`: Uploaded images and videos
/// - `like`: One like per (user, post)
/// - `comment`: Comments on posts
///
/// Ids are UUID strings generated here rather than by the database, and every
/// timestamp is written by the application in UTC.
///
/// # Example
///
/// ```no_run
/// use picstream_shared::models::user::{User, CreateUser};
/// use picstream_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod like;
pub mod post;
pub mod user;

/// Generates a new opaque row id
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
