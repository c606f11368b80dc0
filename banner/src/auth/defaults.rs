use super::auth_service::AuthService;
use super::error::AuthError;
use super::models::{Role, User};

/// Makes sure the configured admin account exists. An existing account of
/// that name is left alone, whatever its password.
pub async fn ensure_admin(
    auth: &AuthService,
    username: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    match auth.create_account(username, password, Role::Admin).await {
        Ok(user) => {
            tracing::info!("Default admin '{}' created", user.username);
            Ok(Some(user))
        }
        Err(AuthError::UserAlreadyExists) => {
            tracing::debug!("Admin '{}' already present", username);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
