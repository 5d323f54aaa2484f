/// Request authentication
///
/// Resolves the "current active user" for a request: the bearer token from
/// the `Authorization` header is validated as an access token, the user it
/// names is loaded, and inactive or deleted accounts are refused. On success
/// an [`AuthContext`] is produced for the router to place in the request
/// extensions.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use picstream_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.email)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::jwt::{validate_token_of_type, JwtError, TokenType};
use crate::models::user::User;

/// Authenticated user attached to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }

    /// Whether this user is the given owner id
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token names a user that no longer exists or is inactive
    InactiveUser,

    /// Database error
    DatabaseError(String),
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Resolves the current active user from request headers
pub async fn authenticate(
    pool: &SqlitePool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token_of_type(token, secret, TokenType::Access).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_id(pool, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .filter(|user| user.is_active)
        .ok_or(AuthError::InactiveUser)?;

    Ok(AuthContext::from_user(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");

        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_context_ownership() {
        let context = AuthContext {
            user_id: "u1".to_string(),
            email: "a@example.com".to_string(),
            is_superuser: false,
            is_verified: true,
        };
        assert!(context.is("u1"));
        assert!(!context.is("u2"));
    }
}
