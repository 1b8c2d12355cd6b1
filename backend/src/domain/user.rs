//! User identity and profile types.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised when constructing user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is not a valid UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email is empty or has no `@` separating non-empty parts.
    #[error("email must be a plausible address")]
    InvalidEmail,
    /// The username is empty, too long, or contains forbidden characters.
    #[error("username may only contain letters, digits, and . @ + - _")]
    InvalidUsername,
    /// A name field is empty or exceeds the length cap.
    #[error("{field} must be between 1 and {max} characters")]
    InvalidName {
        /// Offending field name.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

impl From<UserValidationError> for super::Error {
    fn from(err: UserValidationError) -> Self {
        Self::invalid_request(err.to_string())
    }
}

/// Maximum length shared by username and name fields.
pub const NAME_MAX: usize = 150;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string representation.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for Uuid {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Check an email for the minimal shape accepted at registration.
///
/// Full RFC validation is deliberately out of scope; the store only needs a
/// unique, non-empty `local@domain` string.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || trimmed.len() > 256 || trimmed != email {
        return Err(UserValidationError::InvalidEmail);
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(UserValidationError::InvalidEmail),
    }
}

/// Check a username against the allowed character set and length cap.
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() || username.len() > NAME_MAX {
        return Err(UserValidationError::InvalidUsername);
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(UserValidationError::InvalidUsername)
    }
}

/// Check a first or last name field.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), UserValidationError> {
    if value.trim().is_empty() || value.len() > NAME_MAX {
        return Err(UserValidationError::InvalidName {
            field,
            max: NAME_MAX,
        });
    }
    Ok(())
}

/// Profile returned to API clients.
///
/// `is_subscribed` is viewer dependent: it reports whether the requesting
/// user follows this profile and is always `false` for anonymous viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    /// Stable identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Reference to an already-hosted avatar image, if set.
    pub avatar_url: Option<String>,
    /// Whether the requesting user follows this profile.
    pub is_subscribed: bool,
}
