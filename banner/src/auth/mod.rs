// Public API
pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod password;
pub mod repository;
pub mod token;

// Re-export commonly used types
pub use auth_service::{AuthService, Session};
pub use defaults::ensure_admin;
pub use error::AuthError;
pub use models::{NewUser, Principal, Role, User};
pub use repository::UserRepository;
pub use token::{
    Claims, DEFAULT_TOKEN_TTL_SECS, FixedTokenClock, IssuedToken, SystemTokenClock, TokenClock,
    TokenIssuer,
};
