//! Port abstraction for the tag and ingredient catalogue.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Ingredient, Tag};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalogue adapters.
    pub enum CataloguePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "catalogue connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalogue query failed: {message}",
        /// An imported row collides with an existing unique value.
        Duplicate { message: String } => "duplicate catalogue entry: {message}",
    }
}

/// Fields of a tag to import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct NewTag {
    /// Display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
}

/// Fields of an ingredient to import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct NewIngredient {
    /// Display name.
    pub name: String,
    /// Unit the amount is measured in.
    pub measurement_unit: String,
}

/// Read and bulk-import operations over tags and ingredients.
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// List every tag.
    async fn list_tags(&self) -> Result<Vec<Tag>, CataloguePersistenceError>;

    /// Fetch one tag by id.
    async fn tag_by_id(&self, id: &Uuid) -> Result<Option<Tag>, CataloguePersistenceError>;

    /// List ingredients, optionally filtered by a case-insensitive name
    /// prefix.
    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, CataloguePersistenceError>;

    /// Fetch one ingredient by id.
    async fn ingredient_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Ingredient>, CataloguePersistenceError>;

    /// Bulk-insert tags, returning the inserted count.
    async fn import_tags(&self, rows: &[NewTag]) -> Result<usize, CataloguePersistenceError>;

    /// Bulk-insert ingredients, returning the inserted count.
    async fn import_ingredients(
        &self,
        rows: &[NewIngredient],
    ) -> Result<usize, CataloguePersistenceError>;
}

impl From<CataloguePersistenceError> for Error {
    fn from(err: CataloguePersistenceError) -> Self {
        match err {
            CataloguePersistenceError::Connection { message } => {
                Error::service_unavailable(message)
            }
            CataloguePersistenceError::Query { message } => Error::internal(message),
            CataloguePersistenceError::Duplicate { message } => Error::conflict(message),
        }
    }
}
