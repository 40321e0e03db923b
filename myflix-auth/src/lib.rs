//! Authentication infrastructure for the myFlix API
//!
//! Provides the credential primitives the service builds on:
//! - Password hashing and verification (Argon2id, PHC string format)
//! - Signed, expiring access tokens (JWT, HS256)
//! - Credential verification coordination
//!
//! The crate knows nothing about persistence or HTTP. The service looks up
//! the stored hash and decides what to do with a verified claim set; this
//! crate only answers "does this password match" and "is this token ours".
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use myflix_auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("correct horse battery").unwrap();
//! assert!(hasher.verify("correct horse battery", &hash));
//! assert!(!hasher.verify("wrong password", &hash));
//! ```
//!
//! ## Access Tokens
//! ```
//! use myflix_auth::{Claims, TokenCodec};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_user("0cc9a7c8-5e6f-4a0d-9c3b-2f1e8d7a6b5c", "moviebuff1");
//! let token = codec.issue(&claims).unwrap();
//! let decoded = codec.verify(&token).unwrap();
//! assert_eq!(decoded.sub, claims.sub);
//! ```
//!
//! ## Complete Login Flow
//! ```
//! use myflix_auth::{Authenticator, Claims};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash the password for storage
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify the password and mint a token keyed to the user id
//! let claims = Claims::for_user("0cc9a7c8-5e6f-4a0d-9c3b-2f1e8d7a6b5c", "moviebuff1");
//! let token = auth.login_token("password123", &hash, &claims).unwrap();
//!
//! // Guard: verify the presented token
//! let decoded = auth.verify_token(&token).unwrap();
//! assert_eq!(decoded.username, "moviebuff1");
//! ```

pub mod authenticator;
pub mod claims;
pub mod password;
pub mod token;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use claims::Claims;
pub use claims::TOKEN_TTL_DAYS;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenCodec;
pub use token::TokenError;
