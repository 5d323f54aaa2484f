/// Authentication endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/jwt/login` - Exchange credentials for a bearer token
/// - `POST /auth/jwt/logout` - End the session
/// - `POST /auth/request-verify-token` - Issue an email verification token
/// - `POST /auth/verify` - Verify an account
/// - `POST /auth/forgot-password` - Issue a password reset token
/// - `POST /auth/reset-password` - Set a new password with a reset token
///
/// Verification and reset tokens are handed to the delivery hook, an `info`
/// tracing event carrying the user id and token. The request endpoints
/// answer 202 whether or not the account exists.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserRead,
};
use axum::{extract::State, http::StatusCode, Extension, Form, Json};
use picstream_shared::{
    auth::{
        jwt::{self, Claims, TokenType},
        middleware::AuthContext,
        password,
    },
    models::user::{CreateUser, UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const LOGIN_BAD_CREDENTIALS: &str = "LOGIN_BAD_CREDENTIALS";
const REGISTER_USER_ALREADY_EXISTS: &str = "REGISTER_USER_ALREADY_EXISTS";
const VERIFY_USER_BAD_TOKEN: &str = "VERIFY_USER_BAD_TOKEN";
const VERIFY_USER_ALREADY_VERIFIED: &str = "VERIFY_USER_ALREADY_VERIFIED";
const RESET_PASSWORD_BAD_TOKEN: &str = "RESET_PASSWORD_BAD_TOKEN";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (checked against the password policy)
    pub password: String,
}

/// Login form (OAuth2 password flow field names)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address
    pub username: String,

    pub password: String,
}

/// Bearer token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Request carrying only an email
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Password reset request
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Generic outcome response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Invalid email or weak password
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    req.validate()?;

    password::validate_password(&req.password, &req.email)
        .map_err(|message| ApiError::invalid_field("password", message))?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(REGISTER_USER_ALREADY_EXISTS.to_string()));
    }

    let hashed_password = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            hashed_password,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login endpoint
///
/// Accepts `application/x-www-form-urlencoded` `username` and `password`.
///
/// # Errors
///
/// - `400 Bad Request`: `LOGIN_BAD_CREDENTIALS` for an unknown email, a wrong
///   password or an inactive account
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let bad_credentials = || ApiError::BadRequest(LOGIN_BAD_CREDENTIALS.to_string());

    let Some(user) = User::find_by_email(&state.db, &form.username).await? else {
        // Spend the same hashing time as a real check
        let _ = password::hash_password(&form.password)?;
        return Err(bad_credentials());
    };

    if !password::verify_password(&form.password, &user.hashed_password)? || !user.is_active {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(bad_credentials());
    }

    let claims = Claims::with_expiration(&user.id, TokenType::Access, state.token_lifetime());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Logout endpoint
///
/// Bearer tokens are stateless; the client discards its token.
pub async fn logout(Extension(auth): Extension<AuthContext>) -> StatusCode {
    tracing::info!(user_id = %auth.user_id, "User logged out");
    StatusCode::NO_CONTENT
}

/// Issues a verification token for an active, unverified account
pub async fn request_verify_token(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        if user.is_active && !user.is_verified {
            let token = jwt::create_token(
                &Claims::for_verification(&user.id, &user.email),
                state.jwt_secret(),
            )?;
            tracing::info!(user_id = %user.id, token = %token, "Verification requested");
        }
    }

    Ok(StatusCode::ACCEPTED)
}

/// Marks the account named by a verification token as verified
///
/// # Errors
///
/// - `400 Bad Request`: `VERIFY_USER_BAD_TOKEN` for an invalid or expired
///   token, or one issued for another email; `VERIFY_USER_ALREADY_VERIFIED`
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<UserRead>> {
    let bad_token = || ApiError::BadRequest(VERIFY_USER_BAD_TOKEN.to_string());

    let claims = jwt::validate_token_of_type(&req.token, state.jwt_secret(), TokenType::Verify)
        .map_err(|_| bad_token())?;

    let user = User::find_by_id(&state.db, &claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(bad_token)?;

    let email_matches = claims
        .email
        .as_deref()
        .map(|email| email.eq_ignore_ascii_case(&user.email))
        .unwrap_or(false);
    if !email_matches {
        return Err(bad_token());
    }

    if user.is_verified {
        return Err(ApiError::BadRequest(VERIFY_USER_ALREADY_VERIFIED.to_string()));
    }

    let user = User::update(
        &state.db,
        &user.id,
        UpdateUser {
            is_verified: Some(true),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(bad_token)?;

    tracing::info!(user_id = %user.id, "User verified");

    Ok(Json(user.into()))
}

/// Issues a password reset token for an active account
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        if user.is_active {
            let claims = Claims::for_password_reset(
                &user.id,
                password::password_fingerprint(&user.hashed_password),
            );
            let token = jwt::create_token(&claims, state.jwt_secret())?;
            tracing::info!(user_id = %user.id, token = %token, "Password reset requested");
        }
    }

    Ok(StatusCode::ACCEPTED)
}

/// Sets a new password using a reset token
///
/// A token stops working once the password it was issued for has changed.
///
/// # Errors
///
/// - `400 Bad Request`: `RESET_PASSWORD_BAD_TOKEN`
/// - `422 Unprocessable Entity`: Weak password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let bad_token = || ApiError::BadRequest(RESET_PASSWORD_BAD_TOKEN.to_string());

    let claims = jwt::validate_token_of_type(&req.token, state.jwt_secret(), TokenType::Reset)
        .map_err(|_| bad_token())?;

    let user = User::find_by_id(&state.db, &claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(bad_token)?;

    let fingerprint = password::password_fingerprint(&user.hashed_password);
    if claims.password_fgpt.as_deref() != Some(fingerprint.as_str()) {
        return Err(bad_token());
    }

    password::validate_password(&req.password, &user.email)
        .map_err(|message| ApiError::invalid_field("password", message))?;

    User::update(
        &state.db,
        &user.id,
        UpdateUser {
            hashed_password: Some(password::hash_password(&req.password)?),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(bad_token)?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Password updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: "invalid".to_string(),
            password: "abcdef12".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "abcdef12".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_token_response_shape() {
        let json = serde_json::to_value(TokenResponse {
            access_token: "abc".to_string(),
            token_type: "bearer".to_string(),
        })
        .unwrap();

        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "abc");
    }
}
