/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::error::{AppError, Result};

/// Hash a password with a fresh random salt.
/// The same plaintext produces a different hash on every call.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(rand::thread_rng());
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash.
/// Returns false on mismatch or an unparseable hash; never errors.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("admin").unwrap();
        assert!(verify_password("admin", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("admin").unwrap();
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn same_plaintext_hashes_differently() {
        let first = hash_password("admin").unwrap();
        let second = hash_password("admin").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_verifies_false_instead_of_erroring() {
        assert!(!verify_password("admin", "not-a-phc-string"));
    }
}
