use crate::claims::Claims;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Credential verification coordinator.
///
/// Combines password verification with token issuance so the login flow has
/// a single entry point. Lookup of the stored hash stays with the service;
/// this type never touches storage.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    /// The password did not match. Deliberately carries no detail; the
    /// caller must not be able to tell a bad password from a missing user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator from the process-wide signing secret.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(jwt_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against the stored hash and mint an access token.
    ///
    /// # Arguments
    /// * `password` - plaintext password presented at login
    /// * `stored_hash` - the user's stored password hash
    /// * `claims` - claim set to sign on success
    ///
    /// # Errors
    /// * `InvalidCredentials` - password does not match (or hash unreadable)
    /// * `Token` - signing failed
    pub fn login_token(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &Claims,
    ) -> Result<String, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_codec.issue(claims)?)
    }

    /// Verify a presented token and return its claims.
    ///
    /// # Errors
    /// * `TokenError` - malformed, wrong signature, or expired
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_codec.verify(token)
    }
}
