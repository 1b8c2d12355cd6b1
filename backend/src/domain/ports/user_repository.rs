//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Error, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email is already registered.
        EmailTaken => "a user with this email already exists",
        /// The username is already registered.
        UsernameTaken => "a user with this username already exists",
        /// The referenced user does not exist.
        NotFound => "user not found",
    }
}

/// Stored user record without viewer-dependent annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Stable identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar reference, if set.
    pub avatar_url: Option<String>,
}

impl UserRecord {
    /// Build the API profile, annotating the viewer-dependent flag.
    pub fn into_profile(self, is_subscribed: bool) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar_url: self.avatar_url,
            is_subscribed,
        }
    }
}

/// Fields required to register a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Login email address; unique.
    pub email: String,
    /// Public handle; unique.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 password hash.
    pub password_hash: String,
}

/// Credentials material for session login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsRecord {
    /// Account owner.
    pub user_id: UserId,
    /// Stored argon2 password hash.
    pub password_hash: String,
}

/// User persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn create(&self, user: &NewUserRecord) -> Result<UserRecord, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Fetch login credentials by email, if the account exists.
    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialsRecord>, UserPersistenceError>;

    /// Set the avatar reference of an existing user.
    async fn set_avatar(&self, id: &UserId, avatar_url: &str)
    -> Result<(), UserPersistenceError>;

    /// Clear the avatar reference of an existing user.
    async fn clear_avatar(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}

impl From<UserPersistenceError> for Error {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::Connection { message } => Error::service_unavailable(message),
            UserPersistenceError::Query { message } => Error::internal(message),
            UserPersistenceError::EmailTaken | UserPersistenceError::UsernameTaken => {
                Error::invalid_request(err.to_string())
            }
            UserPersistenceError::NotFound => Error::not_found(err.to_string()),
        }
    }
}
