//! PostgreSQL-backed `CatalogueRepository` implementation using Diesel ORM.
//!
//! Serves the read endpoints and the bulk import paths used by the loader
//! binaries. Imports run in a single transaction so a duplicate row aborts
//! the whole batch.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    CataloguePersistenceError, CatalogueRepository, NewIngredient, NewTag,
};
use crate::domain::{Ingredient, Tag};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_pool_error, unique_violation_constraint,
};
use super::models::{IngredientRow, NewIngredientRow, NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, tags};

/// Diesel-backed implementation of the `CatalogueRepository` port.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CataloguePersistenceError {
    map_pool_error(error, CataloguePersistenceError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CataloguePersistenceError {
    if unique_violation_constraint(&error).is_some() {
        return CataloguePersistenceError::duplicate(error.to_string());
    }
    map_basic_diesel_error(
        error,
        CataloguePersistenceError::query,
        CataloguePersistenceError::connection,
    )
}

/// Escape LIKE metacharacters so a prefix filter matches them literally.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<TagRow> = tags::table
            .select(TagRow::as_select())
            .order_by(tags::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn tag_by_id(&self, id: &Uuid) -> Result<Option<Tag>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<TagRow> = tags::table
            .find(id)
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Tag::from))
    }

    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order_by(ingredients::name.asc())
            .into_boxed();
        if let Some(prefix) = name_prefix {
            query = query.filter(ingredients::name.ilike(format!("{}%", escape_like(prefix))));
        }

        let rows: Vec<IngredientRow> = query.load(&mut conn).await.map_err(map_diesel)?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn ingredient_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Ingredient>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<IngredientRow> = ingredients::table
            .find(id)
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Ingredient::from))
    }

    async fn import_tags(&self, rows: &[NewTag]) -> Result<usize, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_rows: Vec<NewTagRow<'_>> = rows
            .iter()
            .map(|tag| NewTagRow {
                id: Uuid::new_v4(),
                name: &tag.name,
                slug: &tag.slug,
            })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(tags::table)
                    .values(&new_rows)
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn import_ingredients(
        &self,
        rows: &[NewIngredient],
    ) -> Result<usize, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_rows: Vec<NewIngredientRow<'_>> = rows
            .iter()
            .map(|ingredient| NewIngredientRow {
                id: Uuid::new_v4(),
                name: &ingredient.name,
                measurement_unit: &ingredient.measurement_unit,
            })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(ingredients::table)
                    .values(&new_rows)
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and LIKE escaping.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection() {
        let err = map_pool(PoolError::checkout("connection refused"));

        assert!(matches!(err, CataloguePersistenceError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel(diesel::result::Error::NotFound);

        assert!(matches!(err, CataloguePersistenceError::Query { .. }));
    }

    #[rstest]
    #[case("fl", "fl")]
    #[case("50%", "50\\%")]
    #[case("a_b", "a\\_b")]
    #[case("a\\b", "a\\\\b")]
    fn like_metacharacters_are_escaped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }
}
