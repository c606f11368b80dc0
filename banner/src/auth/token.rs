use super::error::AuthError;
use super::models::{Principal, Role, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 600;

/// Wall-clock seconds for token issue and expiry checks.
pub trait TokenClock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTokenClock;

impl TokenClock for SystemTokenClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedTokenClock(pub i64);

impl TokenClock for FixedTokenClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id, as a string per RFC 7519.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Signs and checks HS256 bearer tokens.
///
/// Signature checks are left to `jsonwebtoken`; expiry is checked here
/// against the injected clock so tests can move time.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    clock: Arc<dyn TokenClock>,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self::with_clock(secret, ttl_secs, Arc::new(SystemTokenClock))
    }

    pub fn with_clock(secret: &str, ttl_secs: i64, clock: Arc<dyn TokenClock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            clock,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let iat = self.clock.now_epoch_secs();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat,
            exp: iat + self.ttl_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigningError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_secs,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        if claims.exp <= self.clock.now_epoch_secs() {
            return Err(AuthError::TokenExpired);
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken(format!("bad subject '{}'", claims.sub)))?;

        Ok(Principal {
            user_id,
            role: claims.role,
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
