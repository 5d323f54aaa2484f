/// User endpoints
///
/// - `GET /users/me` - Current user
/// - `PATCH /users/me` - Change own email and/or password
/// - `GET /users/:id` - Any user (superuser only)
/// - `DELETE /users/:id` - Delete any user and their content (superuser only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_id,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use picstream_shared::{
    auth::{authorization::require_superuser, middleware::AuthContext, password},
    models::user::{UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRead {
    pub id: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

/// Self-service update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,
}

async fn load_user(state: &AppState, id: &str) -> ApiResult<User> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Returns the authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserRead>> {
    let user = load_user(&state, &auth.user_id).await?;
    Ok(Json(user.into()))
}

/// Updates the authenticated user's email and/or password
///
/// Changing the email clears the verified flag. A new password must pass
/// the account password policy.
///
/// # Errors
///
/// - `409 Conflict`: Email belongs to another account
/// - `422 Unprocessable Entity`: Invalid email or weak password
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<UserRead>> {
    req.validate()?;

    let user = load_user(&state, &auth.user_id).await?;
    let mut changes = UpdateUser::default();

    if let Some(email) = req.email.filter(|email| !email.eq_ignore_ascii_case(&user.email)) {
        if let Some(other) = User::find_by_email(&state.db, &email).await? {
            if other.id != user.id {
                return Err(ApiError::Conflict(
                    "UPDATE_USER_EMAIL_ALREADY_EXISTS".to_string(),
                ));
            }
        }
        changes.email = Some(email);
        changes.is_verified = Some(false);
    }

    if let Some(new_password) = req.password {
        let email = changes.email.as_deref().unwrap_or(&user.email);
        password::validate_password(&new_password, email)
            .map_err(|message| ApiError::invalid_field("password", message))?;
        changes.hashed_password = Some(password::hash_password(&new_password)?);
    }

    let updated = User::update(&state.db, &user.id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %updated.id, "User updated own account");

    Ok(Json(updated.into()))
}

/// Returns any user (superuser only)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserRead>> {
    require_superuser(&auth)?;
    let id = parse_id(&id, "user")?;

    let user = load_user(&state, &id).await?;
    Ok(Json(user.into()))
}

/// Deletes any user with their posts, likes and comments (superuser only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_superuser(&auth)?;
    let id = parse_id(&id, "user")?;

    if !User::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_read_hides_password() {
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(UserRead::from(user)).unwrap();
        assert_eq!(json["email"], "a@example.com");
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_update_request_validation() {
        let req = UpdateMeRequest {
            email: Some("not-an-email".to_string()),
            password: None,
        };
        assert!(req.validate().is_err());

        let req = UpdateMeRequest {
            email: None,
            password: Some("whatever1".to_string()),
        };
        assert!(req.validate().is_ok());
    }
}
