/// Authentication and authorization utilities
///
/// This module is the identity layer of Picstream:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing, password policy and fingerprints
/// - [`jwt`]: Access, verification and password-reset tokens
/// - [`middleware`]: Authenticated request context
/// - [`authorization`]: Ownership and superuser checks
///
/// # Example
///
/// ```no_run
/// use picstream_shared::auth::password::{hash_password, verify_password};
/// use picstream_shared::auth::jwt::{create_token, validate_token_of_type, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password1")?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// let claims = Claims::new("user-id", TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// let claims = validate_token_of_type(&token, "secret-key", TokenType::Access)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
