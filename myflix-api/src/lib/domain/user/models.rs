use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use uuid::Uuid;

use crate::movie::models::MovieId;
use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Carries the favorites relation as a set of movie ids. The set never
/// holds duplicates; membership order is meaningless.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub birthdate: Option<NaiveDate>,
    pub password_hash: String,
    pub favorites: Vec<MovieId>,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type.
///
/// Assigned at creation and immutable for the life of the account. Access
/// tokens are keyed by this id, never by the (mutable) username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures the username is at least 5 characters and strictly alphanumeric.
/// Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 5;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 5 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `NotAlphanumeric` - Contains anything but ASCII letters and digits
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.len();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(username)
        } else {
            Err(UsernameError::NotAlphanumeric)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Full-name value type; required at registration, must not be blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        if name.trim().is_empty() {
            Err(DisplayNameError::Empty)
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password in transit between the HTTP boundary and the hasher.
///
/// Enforces the minimum-length policy at construction. The Debug impl
/// redacts the content; the plaintext must never reach a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Password shorter than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.len();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Raw login input. Left unparsed on purpose: a structurally invalid
/// username must produce the same rejection as a wrong password.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
    pub birthdate: Option<NaiveDate>,
}

/// Command to update an existing user with optional validated fields.
///
/// All fields are optional to support partial updates. Only provided
/// fields will be updated; an absent birthdate leaves the stored value
/// untouched.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub birthdate: Option<NaiveDate>,
}
