use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password must be at least 8 characters and contain a letter and a digit")]
    WeakPassword,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Token signing error: {0}")]
    TokenSigningError(String),
}

impl AuthError {
    /// Failures the caller can fix by presenting other credentials.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
        )
    }
}

impl From<shared::Error> for AuthError {
    fn from(err: shared::Error) -> Self {
        match err {
            shared::Error::AlreadyExists(_) => AuthError::UserAlreadyExists,
            other => AuthError::StorageError(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}
