//! PostgreSQL-backed shopping-list aggregation using Diesel ORM.
//!
//! The amount summing happens in SQL: ingredient lines of every recipe in
//! the user's cart are grouped by `(name, measurement_unit)` and summed.
//! Report ordering is applied later by the domain's renderer.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ShoppingListQuery, ShoppingListQueryError};
use crate::domain::{ShoppingListLine, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, shopping_cart_items};

/// Diesel-backed implementation of the `ShoppingListQuery` port.
#[derive(Clone)]
pub struct DieselShoppingListQuery {
    pool: DbPool,
}

impl DieselShoppingListQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ShoppingListQueryError {
    map_pool_error(error, ShoppingListQueryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ShoppingListQueryError {
    map_basic_diesel_error(
        error,
        ShoppingListQueryError::query,
        ShoppingListQueryError::connection,
    )
}

#[async_trait]
impl ShoppingListQuery for DieselShoppingListQuery {
    async fn aggregate(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingListLine>, ShoppingListQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let carted = shopping_cart_items::table
            .filter(shopping_cart_items::user_id.eq(*user.as_uuid()))
            .select(shopping_cart_items::recipe_id);

        let rows: Vec<(String, String, Option<i64>)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(carted))
            .group_by((ingredients::name, ingredients::measurement_unit))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                diesel::dsl::sum(recipe_ingredients::amount),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, total)| ShoppingListLine {
                name,
                measurement_unit,
                // SUM over a non-empty group is never NULL.
                total_amount: total.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error mapping in this adapter.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection() {
        let err = map_pool(PoolError::checkout("connection refused"));

        assert!(matches!(err, ShoppingListQueryError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel(diesel::result::Error::NotFound);

        assert!(matches!(err, ShoppingListQueryError::Query { .. }));
    }
}
