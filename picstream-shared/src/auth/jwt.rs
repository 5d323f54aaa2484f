/// JWT token generation and validation module
///
/// Tokens are signed with HS256 and carry the user id as `sub`. The same
/// format serves three purposes, distinguished by the `token_type` claim:
///
/// - **Access**: bearer token for the API (default 1 hour)
/// - **Verify**: proves ownership of an email address; carries the email
/// - **Reset**: authorises one password change; carries a fingerprint of the
///   password hash it was issued against, so it dies once the password changes
///
/// # Example
///
/// ```
/// use picstream_shared::auth::jwt::{create_token, validate_token_of_type, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("5d0c8f3e-2c43-4c45-9c35-4c6f1e8f0a11", TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token_of_type(&token, "your-secret-key", TokenType::Access)?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every token
pub const ISSUER: &str = "picstream";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is valid but was issued for another purpose
    #[error("Wrong token type: expected {expected:?}, got {actual:?}")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Token purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// API bearer token
    Access,

    /// Email verification token
    Verify,

    /// Password reset token
    Reset,
}

impl TokenType {
    /// Default lifetime for this token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(1),
            TokenType::Verify => Duration::hours(1),
            TokenType::Reset => Duration::hours(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Verify => "verify",
            TokenType::Reset => "reset",
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: String,

    /// Issuer - Always "picstream"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token purpose
    pub token_type: TokenType,

    /// Email being verified (verify tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Fingerprint of the password hash (reset tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fgpt: Option<String>,
}

impl Claims {
    /// Creates claims with the default lifetime for `token_type`
    pub fn new(user_id: impl Into<String>, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Creates claims that expire after `expires_in`
    pub fn with_expiration(
        user_id: impl Into<String>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
            email: None,
            password_fgpt: None,
        }
    }

    /// Claims for an email verification token
    pub fn for_verification(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::new(user_id, TokenType::Verify)
        }
    }

    /// Claims for a password reset token
    pub fn for_password_reset(
        user_id: impl Into<String>,
        password_fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            password_fgpt: Some(password_fingerprint.into()),
            ..Self::new(user_id, TokenType::Reset)
        }
    }
}

/// Creates a signed JWT from claims
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, expiry, not-before and issuer, and returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks that it was issued for `expected`
pub fn validate_token_of_type(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongType {
            expected,
            actual: claims.token_type,
        });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_access_token_roundtrip() {
        let claims = Claims::new("user-1", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token_of_type(&token, SECRET, TokenType::Access).unwrap();
        assert_eq!(validated.sub, "user-1");
        assert_eq!(validated.iss, ISSUER);
        assert!(validated.email.is_none());
        assert!(validated.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&Claims::new("user-1", TokenType::Access), SECRET).unwrap();
        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::with_expiration("user-1", TokenType::Access, Duration::minutes(-10));
        assert!(claims.exp < Utc::now().timestamp());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let token = create_token(&Claims::for_verification("user-1", "a@example.com"), SECRET)
            .unwrap();

        let result = validate_token_of_type(&token, SECRET, TokenType::Access);
        assert!(matches!(
            result,
            Err(JwtError::WrongType {
                expected: TokenType::Access,
                actual: TokenType::Verify
            })
        ));

        let claims = validate_token_of_type(&token, SECRET, TokenType::Verify).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_reset_claims_carry_fingerprint() {
        let claims = Claims::for_password_reset("user-1", "abc123");
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token_of_type(&token, SECRET, TokenType::Reset).unwrap();
        assert_eq!(validated.password_fgpt.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_token("not-a-jwt", SECRET).is_err());
    }
}
