/// Authorization checks
///
/// Picstream has two rules: a post or comment may only be removed by the user
/// who created it, and account administration is reserved for superusers.
///
/// # Example
///
/// ```
/// use picstream_shared::auth::authorization::{require_owner, AuthzError};
/// use picstream_shared::auth::middleware::AuthContext;
///
/// let auth = AuthContext {
///     user_id: "user-a".to_string(),
///     email: "a@example.com".to_string(),
///     is_superuser: false,
///     is_verified: true,
/// };
///
/// assert!(require_owner(&auth, "user-a").is_ok());
/// assert!(matches!(require_owner(&auth, "user-b"), Err(AuthzError::NotOwner)));
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// User doesn't own the resource
    #[error("Not authorized to modify this resource")]
    NotOwner,

    /// Operation requires a superuser
    #[error("Superuser privileges required")]
    NotSuperuser,
}

/// Requires the authenticated user to be `owner_id`
pub fn require_owner(auth: &AuthContext, owner_id: &str) -> Result<(), AuthzError> {
    if auth.is(owner_id) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %auth.user_id,
            owner_id = %owner_id,
            "Ownership check failed"
        );
        Err(AuthzError::NotOwner)
    }
}

/// Requires the authenticated user to be a superuser
pub fn require_superuser(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_superuser {
        Ok(())
    } else {
        Err(AuthzError::NotSuperuser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(user_id: &str, is_superuser: bool) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            is_superuser,
            is_verified: false,
        }
    }

    #[test]
    fn test_owner_check() {
        let auth = context("alice", false);
        assert_eq!(require_owner(&auth, "alice"), Ok(()));
        assert_eq!(require_owner(&auth, "bob"), Err(AuthzError::NotOwner));
    }

    #[test]
    fn test_superuser_does_not_bypass_ownership() {
        let admin = context("admin", true);
        assert_eq!(require_owner(&admin, "alice"), Err(AuthzError::NotOwner));
        assert_eq!(require_superuser(&admin), Ok(()));
    }

    #[test]
    fn test_superuser_check() {
        assert_eq!(
            require_superuser(&context("alice", false)),
            Err(AuthzError::NotSuperuser)
        );
    }
}
