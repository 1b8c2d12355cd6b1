//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Writes resolve the draft's tag and ingredient ids before touching the
//! recipe tables, so an unknown id surfaces as a precise port error rather
//! than an opaque foreign key violation. Updates replace the tag and
//! ingredient link sets wholesale inside the same transaction as the field
//! update.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    RecipePersistenceError, RecipeQueryFilter, RecipeRepository, UserRecord,
};
use crate::domain::{RecipeDetail, RecipeIngredient, RecipePreview, Tag, UserId, ValidRecipeDraft};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{
    IngredientRow, NewRecipeIngredientRow, NewRecipeRow, NewRecipeTagRow, RecipeRow, RecipeUpdate,
    TagRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart_items,
    subscriptions, tags, users,
};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> RecipePersistenceError {
    map_pool_error(error, RecipePersistenceError::connection)
}

fn map_diesel(error: diesel::result::Error) -> RecipePersistenceError {
    map_basic_diesel_error(
        error,
        RecipePersistenceError::query,
        RecipePersistenceError::connection,
    )
}

/// Resolve the draft's tag and ingredient ids, failing on the first id the
/// catalogue does not know.
async fn verify_links<C>(
    conn: &mut C,
    draft: &ValidRecipeDraft,
) -> Result<(), RecipePersistenceError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let fields = draft.draft();

    let known_tags: Vec<Uuid> = tags::table
        .filter(tags::id.eq_any(&fields.tag_ids))
        .select(tags::id)
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let known_tags: HashSet<Uuid> = known_tags.into_iter().collect();
    if let Some(missing) = fields.tag_ids.iter().find(|id| !known_tags.contains(id)) {
        return Err(RecipePersistenceError::unknown_tag(*missing));
    }

    let ingredient_ids: Vec<Uuid> = fields.ingredients.iter().map(|entry| entry.id).collect();
    let known_ingredients: Vec<Uuid> = ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(ingredients::id)
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let known_ingredients: HashSet<Uuid> = known_ingredients.into_iter().collect();
    if let Some(missing) = ingredient_ids
        .iter()
        .find(|id| !known_ingredients.contains(id))
    {
        return Err(RecipePersistenceError::unknown_ingredient(*missing));
    }

    Ok(())
}

fn tag_links(recipe_id: Uuid, draft: &ValidRecipeDraft) -> Vec<NewRecipeTagRow> {
    draft
        .draft()
        .tag_ids
        .iter()
        .map(|tag_id| NewRecipeTagRow {
            recipe_id,
            tag_id: *tag_id,
        })
        .collect()
}

fn ingredient_links(recipe_id: Uuid, draft: &ValidRecipeDraft) -> Vec<NewRecipeIngredientRow> {
    draft
        .draft()
        .ingredients
        .iter()
        .map(|entry| NewRecipeIngredientRow {
            recipe_id,
            ingredient_id: entry.id,
            amount: entry.amount,
        })
        .collect()
}

/// Assemble full details for the given recipe rows, preserving their order.
///
/// Viewer-dependent flags come back false when no viewer is given.
async fn load_details<C>(
    conn: &mut C,
    rows: Vec<RecipeRow>,
    viewer: Option<&UserId>,
) -> Result<Vec<RecipeDetail>, RecipePersistenceError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<Uuid> = rows.iter().map(|row| row.author_id).collect();

    let author_rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let authors: HashMap<Uuid, UserRecord> = author_rows
        .into_iter()
        .map(|row| (row.id, UserRecord::from(row)))
        .collect();

    let tag_rows: Vec<(Uuid, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order_by(tags::name.asc())
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (recipe_id, row) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(row.into());
    }

    let ingredient_rows: Vec<(Uuid, IngredientRow, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order_by(ingredients::name.asc())
        .select((
            recipe_ingredients::recipe_id,
            IngredientRow::as_select(),
            recipe_ingredients::amount,
        ))
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let mut ingredients_by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
    for (recipe_id, row, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredient {
                id: row.id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount,
            });
    }

    let (favorited, in_cart, followed) = match viewer {
        Some(viewer) => {
            let favorited: Vec<Uuid> = favorites::table
                .filter(
                    favorites::user_id
                        .eq(viewer.as_uuid())
                        .and(favorites::recipe_id.eq_any(&recipe_ids)),
                )
                .select(favorites::recipe_id)
                .load(conn)
                .await
                .map_err(map_diesel)?;
            let in_cart: Vec<Uuid> = shopping_cart_items::table
                .filter(
                    shopping_cart_items::user_id
                        .eq(viewer.as_uuid())
                        .and(shopping_cart_items::recipe_id.eq_any(&recipe_ids)),
                )
                .select(shopping_cart_items::recipe_id)
                .load(conn)
                .await
                .map_err(map_diesel)?;
            let followed: Vec<Uuid> = subscriptions::table
                .filter(
                    subscriptions::subscriber_id
                        .eq(viewer.as_uuid())
                        .and(subscriptions::author_id.eq_any(&author_ids)),
                )
                .select(subscriptions::author_id)
                .load(conn)
                .await
                .map_err(map_diesel)?;
            (
                favorited.into_iter().collect::<HashSet<_>>(),
                in_cart.into_iter().collect::<HashSet<_>>(),
                followed.into_iter().collect::<HashSet<_>>(),
            )
        }
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| RecipePersistenceError::query("recipe author missing"))?;
            Ok(RecipeDetail {
                id: row.id,
                author: author.into_profile(followed.contains(&row.author_id)),
                name: row.name,
                body: row.body,
                cooking_time_minutes: row.cooking_time_minutes,
                image_url: row.image_url,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
                is_favorited: favorited.contains(&row.id),
                is_in_shopping_cart: in_cart.contains(&row.id),
                created_at: row.created_at,
            })
        })
        .collect()
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(
        &self,
        author: &UserId,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        verify_links(&mut conn, draft).await?;

        let recipe_id = Uuid::new_v4();
        let fields = draft.draft();
        let recipe_row = NewRecipeRow {
            id: recipe_id,
            author_id: *author.as_uuid(),
            name: &fields.name,
            body: &fields.body,
            cooking_time_minutes: fields.cooking_time_minutes,
            image_url: &fields.image_url,
        };
        let tag_rows = tag_links(recipe_id, draft);
        let ingredient_rows = ingredient_links(recipe_id, draft);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(recipes::table)
                    .values(&recipe_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(recipe_tags::table)
                    .values(&tag_rows)
                    .execute(conn)
                    .await?;
                diesel::insert_into(recipe_ingredients::table)
                    .values(&ingredient_rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)?;

        let row: RecipeRow = recipes::table
            .find(recipe_id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel)?;
        let mut details = load_details(&mut conn, vec![row], None).await?;
        details
            .pop()
            .ok_or_else(|| RecipePersistenceError::query("created recipe missing"))
    }

    async fn update(
        &self,
        id: &Uuid,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        verify_links(&mut conn, draft).await?;

        let recipe_id = *id;
        let fields = draft.draft();
        let changeset = RecipeUpdate {
            name: &fields.name,
            body: &fields.body,
            cooking_time_minutes: fields.cooking_time_minutes,
            image_url: &fields.image_url,
            updated_at: chrono::Utc::now(),
        };
        let tag_rows = tag_links(recipe_id, draft);
        let ingredient_rows = ingredient_links(recipe_id, draft);

        let updated = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(recipes::table.find(recipe_id))
                        .set(&changeset)
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Ok(0);
                    }
                    diesel::delete(
                        recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(recipe_tags::table)
                        .values(&tag_rows)
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&ingredient_rows)
                        .execute(conn)
                        .await?;
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;
        if updated == 0 {
            return Err(RecipePersistenceError::not_found());
        }

        let row: RecipeRow = recipes::table
            .find(recipe_id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel)?;
        let mut details = load_details(&mut conn, vec![row], None).await?;
        details
            .pop()
            .ok_or_else(|| RecipePersistenceError::query("updated recipe missing"))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // Link, favourite and cart rows go with the recipe via ON DELETE
        // CASCADE.
        let deleted = diesel::delete(recipes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if deleted == 0 {
            return Err(RecipePersistenceError::not_found());
        }
        Ok(())
    }

    async fn fetch(
        &self,
        id: &Uuid,
        viewer: Option<&UserId>,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<RecipeRow> = recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        match row {
            Some(row) => {
                let mut details = load_details(&mut conn, vec![row], viewer).await?;
                Ok(details.pop())
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &RecipeQueryFilter,
        viewer: Option<&UserId>,
    ) -> Result<Vec<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = recipes::table
            .select(RecipeRow::as_select())
            .order_by(recipes::created_at.desc())
            .into_boxed();

        if let Some(author) = &filter.author {
            query = query.filter(recipes::author_id.eq(*author.as_uuid()));
        }
        if !filter.tag_slugs.is_empty() {
            let tagged = recipe_tags::table
                .inner_join(tags::table)
                .filter(tags::slug.eq_any(filter.tag_slugs.clone()))
                .select(recipe_tags::recipe_id);
            query = query.filter(recipes::id.eq_any(tagged));
        }
        if let Some(viewer) = viewer {
            if filter.is_favorited {
                let favorited = favorites::table
                    .filter(favorites::user_id.eq(*viewer.as_uuid()))
                    .select(favorites::recipe_id);
                query = query.filter(recipes::id.eq_any(favorited));
            }
            if filter.is_in_shopping_cart {
                let carted = shopping_cart_items::table
                    .filter(shopping_cart_items::user_id.eq(*viewer.as_uuid()))
                    .select(shopping_cart_items::recipe_id);
                query = query.filter(recipes::id.eq_any(carted));
            }
        }

        let rows: Vec<RecipeRow> = query.load(&mut conn).await.map_err(map_diesel)?;
        load_details(&mut conn, rows, viewer).await
    }

    async fn author_id(&self, id: &Uuid) -> Result<Option<UserId>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let author: Option<Uuid> = recipes::table
            .find(id)
            .select(recipes::author_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(author.map(UserId::from_uuid))
    }

    async fn previews_for_author(
        &self,
        author: &UserId,
        limit: Option<i64>,
    ) -> Result<(Vec<RecipePreview>, i64), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let count: i64 = recipes::table
            .filter(recipes::author_id.eq(author.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let mut query = recipes::table
            .filter(recipes::author_id.eq(*author.as_uuid()))
            .order_by(recipes::created_at.desc())
            .select((
                recipes::id,
                recipes::name,
                recipes::image_url,
                recipes::cooking_time_minutes,
            ))
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let rows: Vec<(Uuid, String, String, i32)> =
            query.load(&mut conn).await.map_err(map_diesel)?;

        let previews = rows
            .into_iter()
            .map(|(id, name, image_url, cooking_time_minutes)| RecipePreview {
                id,
                name,
                image_url,
                cooking_time_minutes,
            })
            .collect();

        Ok((previews, count))
    }
}
