//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Strongly typed errors**: every database error is mapped to the port's
//!   persistence error type.

mod diesel_catalogue_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_membership_repository;
mod diesel_recipe_repository;
mod diesel_shopping_list_query;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_membership_repository::DieselMembershipRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_shopping_list_query::DieselShoppingListQuery;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
