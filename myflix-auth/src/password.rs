use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use thiserror::Error;

/// Error type for password hashing.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Salted one-way password transform.
///
/// Internally Argon2id. Hashing the same plaintext twice produces different
/// outputs because the salt is random; `verify` reads the salt back out of
/// the PHC string.
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password for storage.
    ///
    /// # Returns
    /// PHC string format hash (algorithm, parameters, salt, and digest).
    ///
    /// # Errors
    /// * `HashingFailed` - the hashing operation itself failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns false on mismatch and also on a stored hash that cannot be
    /// parsed; a caller can never distinguish a corrupt hash from a wrong
    /// password through this function.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
