use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use thiserror::Error;

use crate::claims::Claims;

/// Error type for token operations.
///
/// Verification failures are distinguishable so callers can log the reason,
/// but every variant must surface to the client as the same generic
/// authentication failure.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,
}

/// Signs and verifies self-contained access tokens.
///
/// HS256 over the [`Claims`] set. The signing secret is fixed at
/// construction; issue and verify must share the same codec configuration
/// or nothing will verify.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from the process-wide signing secret.
    ///
    /// The secret should be at least 256 bits for HS256 and comes from
    /// configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign a claim set into a compact token string.
    ///
    /// # Errors
    /// * `Signing` - serialization or signing failed
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a presented token: structure, signature, then expiry.
    ///
    /// # Errors
    /// * `Malformed` - not a structurally valid token
    /// * `InvalidSignature` - signed with a different secret
    /// * `Expired` - `exp` is in the past
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(self.algorithm);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET);
        let claims = Claims::for_user("user-id", "moviebuff1");

        let token = codec.issue(&claims).expect("Failed to issue token");
        assert!(!token.is_empty());

        let decoded = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_verify_malformed_token() {
        let codec = TokenCodec::new(SECRET);

        let result = codec.verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let result = codec.verify("");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"a_different_secret_also_32_bytes!!");

        let token = codec
            .issue(&Claims::for_user("user-id", "moviebuff1"))
            .unwrap();

        let result = other.verify(&token);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_verify_expired_token() {
        let codec = TokenCodec::new(SECRET);

        // Two hours in the past clears the decoder's clock-skew leeway.
        let expired = chrono::Utc::now().timestamp() - 2 * 60 * 60;
        let claims = Claims::for_user("user-id", "moviebuff1").with_expiration(expired);

        let token = codec.issue(&claims).unwrap();

        let result = codec.verify(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_still_rejected() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"a_different_secret_also_32_bytes!!");

        let expired = chrono::Utc::now().timestamp() - 2 * 60 * 60;
        let token = codec
            .issue(&Claims::for_user("user-id", "moviebuff1").with_expiration(expired))
            .unwrap();

        assert!(other.verify(&token).is_err());
    }
}
