//! Port abstraction for recipe persistence adapters.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, RecipeDetail, RecipePreview, UserId, ValidRecipeDraft};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// A draft referenced a tag id not present in the catalogue.
        UnknownTag { tag_id: Uuid } => "unknown tag: {tag_id}",
        /// A draft referenced an ingredient id not present in the catalogue.
        UnknownIngredient { ingredient_id: Uuid } => "unknown ingredient: {ingredient_id}",
        /// The referenced recipe does not exist.
        NotFound => "recipe not found",
    }
}

/// Filters accepted by [`RecipeRepository::list`].
///
/// `is_favorited` and `is_in_shopping_cart` only take effect for
/// authenticated viewers; the adapter ignores them when `viewer` is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQueryFilter {
    /// Only recipes by this author.
    pub author: Option<UserId>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes the viewer favourited.
    pub is_favorited: bool,
    /// Only recipes in the viewer's shopping cart.
    pub is_in_shopping_cart: bool,
}

/// Recipe persistence operations.
///
/// Reads take an optional viewer id so `is_favorited`, `is_in_shopping_cart`
/// and the author's `is_subscribed` flag come back populated in one call.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe with its tag and ingredient links in one transaction.
    async fn create(
        &self,
        author: &UserId,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError>;

    /// Replace an existing recipe's fields and links in one transaction.
    async fn update(
        &self,
        id: &Uuid,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError>;

    /// Delete a recipe and its dependent rows.
    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError>;

    /// Fetch one recipe with viewer-dependent flags.
    async fn fetch(
        &self,
        id: &Uuid,
        viewer: Option<&UserId>,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError>;

    /// List recipes matching the filter, newest first.
    async fn list(
        &self,
        filter: &RecipeQueryFilter,
        viewer: Option<&UserId>,
    ) -> Result<Vec<RecipeDetail>, RecipePersistenceError>;

    /// Resolve a recipe's author without loading the full detail.
    async fn author_id(&self, id: &Uuid) -> Result<Option<UserId>, RecipePersistenceError>;

    /// Preview an author's recipes, newest first, with the author's total
    /// recipe count.
    async fn previews_for_author(
        &self,
        author: &UserId,
        limit: Option<i64>,
    ) -> Result<(Vec<RecipePreview>, i64), RecipePersistenceError>;
}

impl From<RecipePersistenceError> for Error {
    fn from(err: RecipePersistenceError) -> Self {
        match err {
            RecipePersistenceError::Connection { message } => Error::service_unavailable(message),
            RecipePersistenceError::Query { message } => Error::internal(message),
            RecipePersistenceError::UnknownTag { .. }
            | RecipePersistenceError::UnknownIngredient { .. } => {
                Error::invalid_request(err.to_string())
            }
            RecipePersistenceError::NotFound => Error::not_found(err.to_string()),
        }
    }
}
