//! PostgreSQL-backed `MembershipRepository` implementation using Diesel ORM.
//!
//! Favourites and shopping cart entries live in separate tables with the
//! same `(user_id, recipe_id)` shape. Double adds are detected through
//! `ON CONFLICT DO NOTHING` row counts rather than unique violation parsing,
//! which keeps the add path free of error-message inspection.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{MembershipKind, MembershipPersistenceError, MembershipRepository};
use crate::domain::{RecipePreview, UserId};

use super::diesel_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_pool_error,
};
use super::models::{NewCartItemRow, NewFavoriteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, recipes, shopping_cart_items};

/// Diesel-backed implementation of the `MembershipRepository` port.
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> MembershipPersistenceError {
    map_pool_error(error, MembershipPersistenceError::connection)
}

fn map_diesel(error: diesel::result::Error) -> MembershipPersistenceError {
    // An FK violation on insert means the recipe vanished between the
    // preview read and the insert.
    if is_foreign_key_violation(&error) {
        return MembershipPersistenceError::recipe_not_found();
    }
    map_basic_diesel_error(
        error,
        MembershipPersistenceError::query,
        MembershipPersistenceError::connection,
    )
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn add(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<RecipePreview, MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let preview: Option<(Uuid, String, String, i32)> = recipes::table
            .find(recipe_id)
            .select((
                recipes::id,
                recipes::name,
                recipes::image_url,
                recipes::cooking_time_minutes,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        let Some((id, name, image_url, cooking_time_minutes)) = preview else {
            return Err(MembershipPersistenceError::recipe_not_found());
        };

        let inserted = match kind {
            MembershipKind::Favorite => {
                diesel::insert_into(favorites::table)
                    .values(NewFavoriteRow {
                        user_id: *user.as_uuid(),
                        recipe_id: *recipe_id,
                    })
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await
            }
            MembershipKind::ShoppingCart => {
                diesel::insert_into(shopping_cart_items::table)
                    .values(NewCartItemRow {
                        user_id: *user.as_uuid(),
                        recipe_id: *recipe_id,
                    })
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel)?;

        if inserted == 0 {
            return Err(MembershipPersistenceError::already_present());
        }

        Ok(RecipePreview {
            id,
            name,
            image_url,
            cooking_time_minutes,
        })
    }

    async fn remove(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<(), MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = match kind {
            MembershipKind::Favorite => {
                diesel::delete(
                    favorites::table.filter(
                        favorites::user_id
                            .eq(user.as_uuid())
                            .and(favorites::recipe_id.eq(recipe_id)),
                    ),
                )
                .execute(&mut conn)
                .await
            }
            MembershipKind::ShoppingCart => {
                diesel::delete(
                    shopping_cart_items::table.filter(
                        shopping_cart_items::user_id
                            .eq(user.as_uuid())
                            .and(shopping_cart_items::recipe_id.eq(recipe_id)),
                    ),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_diesel)?;

        if deleted == 0 {
            return Err(MembershipPersistenceError::not_present());
        }
        Ok(())
    }
}
