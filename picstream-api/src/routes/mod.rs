/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, verification and password reset
/// - `users`: Current user and superuser account administration
/// - `posts`: Media upload and post deletion
/// - `feed`: The chronological feed
/// - `likes`: Like and unlike
/// - `comments`: Add and delete comments

pub mod auth;
pub mod comments;
pub mod feed;
pub mod health;
pub mod likes;
pub mod posts;
pub mod users;

use crate::error::{ApiError, ApiResult};
use uuid::Uuid;

/// Parses a path id, answering 400 for anything that is not a UUID
///
/// Returns the canonical hyphenated form the database stores.
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}
