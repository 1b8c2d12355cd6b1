//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogueRepository, MembershipRepository, RecipeRepository, ShoppingListQuery,
    SubscriptionRepository, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User account persistence.
    pub users: Arc<dyn UserRepository>,
    /// Tag and ingredient catalogue.
    pub catalogue: Arc<dyn CatalogueRepository>,
    /// Recipe persistence and viewer-aware reads.
    pub recipes: Arc<dyn RecipeRepository>,
    /// Favourite and shopping-cart membership.
    pub memberships: Arc<dyn MembershipRepository>,
    /// Author subscriptions.
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Shopping-list aggregation.
    pub shopping_list: Arc<dyn ShoppingListQuery>,
}
