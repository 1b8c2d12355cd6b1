//! Outbound port traits the domain depends on.
//!
//! Adapters under `outbound::persistence` implement these traits; handlers
//! receive them as `Arc<dyn Trait>` through the shared HTTP state.

mod macros;

pub mod catalogue_repository;
pub mod membership_repository;
pub mod recipe_repository;
pub mod shopping_list_query;
pub mod subscription_repository;
pub mod user_repository;

pub(crate) use macros::define_port_error;

pub use catalogue_repository::{
    CataloguePersistenceError, CatalogueRepository, NewIngredient, NewTag,
};
pub use membership_repository::{
    MembershipKind, MembershipPersistenceError, MembershipRepository,
};
pub use recipe_repository::{RecipePersistenceError, RecipeQueryFilter, RecipeRepository};
pub use shopping_list_query::{ShoppingListQuery, ShoppingListQueryError};
pub use subscription_repository::{SubscriptionPersistenceError, SubscriptionRepository};
pub use user_repository::{
    CredentialsRecord, NewUserRecord, UserPersistenceError, UserRecord, UserRepository,
};
