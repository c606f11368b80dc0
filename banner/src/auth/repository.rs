use super::error::AuthError;
use super::models::{NewUser, User};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the account. A taken username is `UserAlreadyExists`.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;
}
