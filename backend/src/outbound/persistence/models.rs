//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::UserRecord;
use crate::domain::{Ingredient, Tag, UserId};

use super::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart_items,
    subscriptions, tags, users,
};

/// Row struct for reading user records, without credential material.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            avatar_url: row.avatar_url,
        }
    }
}

/// Insertable struct for registering new users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the tags table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// Insertable struct for bulk tag imports.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Row struct for reading from the ingredients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

/// Insertable struct for bulk ingredient imports.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ingredients)]
pub(crate) struct NewIngredientRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub measurement_unit: &'a str,
}

/// Row struct for reading from the recipes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub body: String,
    pub cooking_time_minutes: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new recipes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: &'a str,
    pub body: &'a str,
    pub cooking_time_minutes: i32,
    pub image_url: &'a str,
}

/// Changeset struct for wholesale recipe updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeUpdate<'a> {
    pub name: &'a str,
    pub body: &'a str,
    pub cooking_time_minutes: i32,
    pub image_url: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for recipe-to-tag links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_tags)]
pub(crate) struct NewRecipeTagRow {
    pub recipe_id: Uuid,
    pub tag_id: Uuid,
}

/// Insertable struct for recipe-to-ingredient links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub(crate) struct NewRecipeIngredientRow {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub amount: i32,
}

/// Insertable struct for favourite entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorites)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
}

/// Insertable struct for shopping cart entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shopping_cart_items)]
pub(crate) struct NewCartItemRow {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
}

/// Insertable struct for subscription entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct NewSubscriptionRow {
    pub subscriber_id: Uuid,
    pub author_id: Uuid,
}
