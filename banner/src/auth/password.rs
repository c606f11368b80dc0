use argon2::password_hash::rand_core::OsRng;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

use super::error::AuthError;

const MIN_PASSWORD_LEN: usize = 8;

/// Produces a salted argon2 PHC string. Rejects passwords below the policy.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    check_password_policy(password)?;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashError(e.to_string()))
}

/// A malformed stored hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn check_password_policy(password: &str) -> Result<(), AuthError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(AuthError::WeakPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("banner-admin1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("banner-admin1", &hash).unwrap());
        assert!(!verify_password("banner-admin2", &hash).unwrap());
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("abcdefg1").is_ok());

        assert!(matches!(
            check_password_policy("abc1"),
            Err(AuthError::WeakPassword)
        ));
        assert!(check_password_policy("onlyletters").is_err());
        assert!(check_password_policy("123456789").is_err());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same-secret9").unwrap();
        let b = hash_password("same-secret9").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("whatever1", "not-a-phc-string"),
            Err(AuthError::PasswordHashError(_))
        ));
    }
}
