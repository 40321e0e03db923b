use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Token lifetime in days. Issuance and verification share this value; there
/// is no per-token override.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claim set carried by every access token.
///
/// `sub` is always the user's immutable id. Usernames are mutable through
/// profile updates, so a token keyed by username could resolve to the wrong
/// identity after a rename; the username here is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's stable id.
    pub sub: String,

    /// Username at issuance time. Informational, never used for resolution.
    pub username: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for a freshly authenticated user.
    ///
    /// Expiry is fixed at [`TOKEN_TTL_DAYS`] from now.
    pub fn for_user(user_id: impl ToString, username: impl Into<String>) -> Self {
        let now = Utc::now();
        let expires = now + Duration::days(TOKEN_TTL_DAYS);

        Self {
            sub: user_id.to_string(),
            username: username.into(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        }
    }

    /// Override the expiration timestamp.
    ///
    /// Exists so tests can mint already-expired tokens.
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Whether the claim set is expired at `current_timestamp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
