//! Port abstraction for author subscriptions.
use async_trait::async_trait;

use crate::domain::{Error, UserId};

use super::define_port_error;
use super::user_repository::UserRecord;

define_port_error! {
    /// Persistence errors raised by subscription adapters.
    pub enum SubscriptionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "subscription repository query failed: {message}",
        /// A user may not subscribe to themselves.
        SelfSubscription => "cannot subscribe to yourself",
        /// The subscription already exists.
        AlreadySubscribed => "already subscribed to this author",
        /// No subscription exists to remove.
        NotSubscribed => "not subscribed to this author",
        /// The referenced author does not exist.
        AuthorNotFound => "author not found",
    }
}

/// Subscription operations.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Record that `subscriber` follows `author`.
    async fn subscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError>;

    /// Remove the subscription from `subscriber` to `author`.
    async fn unsubscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError>;

    /// Report whether `subscriber` follows `author`.
    async fn is_subscribed(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionPersistenceError>;

    /// List the authors `subscriber` follows, ordered by username.
    async fn followed_authors(
        &self,
        subscriber: &UserId,
    ) -> Result<Vec<UserRecord>, SubscriptionPersistenceError>;
}

impl From<SubscriptionPersistenceError> for Error {
    fn from(err: SubscriptionPersistenceError) -> Self {
        match err {
            SubscriptionPersistenceError::Connection { message } => {
                Error::service_unavailable(message)
            }
            SubscriptionPersistenceError::Query { message } => Error::internal(message),
            SubscriptionPersistenceError::SelfSubscription
            | SubscriptionPersistenceError::AlreadySubscribed => {
                Error::invalid_request(err.to_string())
            }
            SubscriptionPersistenceError::NotSubscribed
            | SubscriptionPersistenceError::AuthorNotFound => Error::not_found(err.to_string()),
        }
    }
}
