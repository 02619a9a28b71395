//! # Password hashing and verification (Argon2id)
//!
//! - [`hash_password`] generates a random salt via [`OsRng`], hashes the
//!   plaintext with the default Argon2id parameters and returns a PHC-format
//!   string (`$argon2id$v=19$m=19456,t=2,p=1$...`). That string is what the
//!   `password_hash` column stores; the raw password never is.
//! - [`verify_password`] parses a stored PHC string and checks a candidate
//!   against it. A malformed stored hash counts as a mismatch and is logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, Result};

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Check a password against a PHC-format hash string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let first = hash_password("pw").unwrap();
        let second = hash_password("pw").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("pw$"));
        assert_ne!(first, second);
        assert!(verify_password("pw", &first));
        assert!(verify_password("pw", &second));
        assert!(!verify_password("PW", &first));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("pw", "pw"));
        assert!(!verify_password("pw", ""));
    }
}
