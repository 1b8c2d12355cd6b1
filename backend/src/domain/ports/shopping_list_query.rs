//! Port abstraction for the shopping-list aggregation read.
use async_trait::async_trait;

use crate::domain::{Error, ShoppingListLine, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by shopping-list adapters.
    pub enum ShoppingListQueryError {
        /// Repository connection could not be established.
        Connection { message: String } => "shopping list connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "shopping list query failed: {message}",
    }
}

/// Aggregation read over the user's shopping cart.
#[async_trait]
pub trait ShoppingListQuery: Send + Sync {
    /// Sum ingredient amounts across every recipe in the user's cart,
    /// grouped by ingredient name and measurement unit.
    async fn aggregate(&self, user: &UserId)
    -> Result<Vec<ShoppingListLine>, ShoppingListQueryError>;
}

impl From<ShoppingListQueryError> for Error {
    fn from(err: ShoppingListQueryError) -> Self {
        match err {
            ShoppingListQueryError::Connection { message } => Error::service_unavailable(message),
            ShoppingListQueryError::Query { message } => Error::internal(message),
        }
    }
}
