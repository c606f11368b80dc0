use super::error::AuthError;
use super::models::{NewUser, Principal, Role, User};
use super::password::{hash_password, verify_password};
use super::repository::UserRepository;
use super::token::{IssuedToken, TokenIssuer};
use std::sync::Arc;

const MAX_USERNAME_LEN: usize = 64;

/// Successful login: the account and its bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { user_repo, tokens }
    }

    /// Creates a plain `user` account.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.create_account(username, password, Role::User).await
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;

        if self.user_repo.username_exists(&username).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repo
            .create(NewUser::new(username, password_hash, role))
            .await?;

        tracing::info!("Created {} account '{}'", user.role, user.username);
        Ok(user)
    }

    /// Authenticate a user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&user)?;
        tracing::debug!("Issued token for '{}'", user.username);
        Ok(Session { user, token })
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens.verify(token)
    }

    pub fn authorize(&self, principal: &Principal, required: Role) -> Result<(), AuthError> {
        if principal.role.satisfies(required) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied)
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn validate_username(username: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidUsername(
            "username cannot be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername(format!(
            "username longer than {} characters",
            MAX_USERNAME_LEN
        )));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::FixedTokenClock;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecUserRepository {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for VecUserRepository {
        async fn create(&self, user: NewUser) -> Result<User, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == user.username) {
                return Err(AuthError::UserAlreadyExists);
            }
            let user = user.into_user(users.len() as i64 + 1, Utc::now());
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
            Ok(self.find_by_username(username).await?.is_some())
        }
    }

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(VecUserRepository::default()),
            TokenIssuer::with_clock("secret", 600, Arc::new(FixedTokenClock(1_700_000_000))),
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();

        let user = auth.register("  ana ", "password1").await.unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.role, Role::User);

        let session = auth.login("ana", "password1").await.unwrap();
        let principal = auth.verify(&session.token.token).unwrap();
        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let auth = service();
        auth.register("ana", "password1").await.unwrap();

        let result = auth.login("ana", "password2").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let result = auth.login("nobody", "password1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_registrations() {
        let auth = service();
        auth.register("ana", "password1").await.unwrap();

        let result = auth.register("ana", "password9").await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));

        let result = auth.register("bo", "short").await;
        assert!(matches!(result, Err(AuthError::WeakPassword)));

        let result = auth.register("   ", "password1").await;
        assert!(matches!(result, Err(AuthError::InvalidUsername(_))));
    }

    #[tokio::test]
    async fn test_authorize_admin_only() {
        let auth = service();
        let user = Principal {
            user_id: 1,
            role: Role::User,
        };
        let admin = Principal {
            user_id: 2,
            role: Role::Admin,
        };

        assert!(auth.authorize(&user, Role::User).is_ok());
        assert!(matches!(
            auth.authorize(&user, Role::Admin),
            Err(AuthError::PermissionDenied)
        ));
        assert!(auth.authorize(&admin, Role::Admin).is_ok());
    }
}
