//! Port abstraction for per-user recipe collections.
//!
//! Favourites and shopping carts share the same shape: a set of
//! `(user, recipe)` pairs with idempotency errors on double add or absent
//! remove. One port serves both, keyed by [`MembershipKind`].
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, RecipePreview, UserId};

use super::define_port_error;

/// Which collection a membership operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipKind {
    /// The user's favourites.
    Favorite,
    /// The user's shopping cart.
    ShoppingCart,
}

define_port_error! {
    /// Persistence errors raised by membership adapters.
    pub enum MembershipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "membership repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "membership repository query failed: {message}",
        /// The recipe is already in the collection.
        AlreadyPresent => "recipe is already in the collection",
        /// The recipe is not in the collection.
        NotPresent => "recipe is not in the collection",
        /// The referenced recipe does not exist.
        RecipeNotFound => "recipe not found",
    }
}

/// Membership operations over favourites and shopping carts.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Add a recipe to the user's collection, returning its preview.
    async fn add(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<RecipePreview, MembershipPersistenceError>;

    /// Remove a recipe from the user's collection.
    async fn remove(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<(), MembershipPersistenceError>;
}

impl From<MembershipPersistenceError> for Error {
    fn from(err: MembershipPersistenceError) -> Self {
        match err {
            MembershipPersistenceError::Connection { message } => {
                Error::service_unavailable(message)
            }
            MembershipPersistenceError::Query { message } => Error::internal(message),
            MembershipPersistenceError::AlreadyPresent | MembershipPersistenceError::NotPresent => {
                Error::invalid_request(err.to_string())
            }
            MembershipPersistenceError::RecipeNotFound => Error::not_found(err.to_string()),
        }
    }
}
