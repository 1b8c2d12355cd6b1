//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, update this file to match
//! (or regenerate it with `diesel print-schema`).

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login email; unique.
        email -> Varchar,
        /// Public handle; unique.
        username -> Varchar,
        /// Given name.
        first_name -> Varchar,
        /// Family name.
        last_name -> Varchar,
        /// Argon2 password hash.
        password_hash -> Varchar,
        /// Avatar reference, if set.
        avatar_url -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follows between users; a row means `subscriber_id` follows
    /// `author_id`. Self-follows are rejected by a check constraint.
    subscriptions (subscriber_id, author_id) {
        /// Following user.
        subscriber_id -> Uuid,
        /// Followed author.
        author_id -> Uuid,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe tags with unique names and slugs.
    tags (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name; unique.
        name -> Varchar,
        /// URL-safe slug; unique.
        slug -> Varchar,
    }
}

diesel::table! {
    /// Ingredient catalogue; unique on `(name, measurement_unit)`.
    ingredients (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Unit the amount is measured in.
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Recipes authored by users.
    recipes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning author.
        author_id -> Uuid,
        /// Recipe title.
        name -> Varchar,
        /// Free-text preparation instructions.
        body -> Text,
        /// Cooking time in minutes; positive by check constraint.
        cooking_time_minutes -> Int4,
        /// Reference to an already-hosted image.
        image_url -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe-to-tag links.
    recipe_tags (recipe_id, tag_id) {
        /// Owning recipe.
        recipe_id -> Uuid,
        /// Attached tag.
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// Recipe-to-ingredient links with amounts.
    recipe_ingredients (recipe_id, ingredient_id) {
        /// Owning recipe.
        recipe_id -> Uuid,
        /// Referenced ingredient.
        ingredient_id -> Uuid,
        /// Required amount; positive by check constraint.
        amount -> Int4,
    }
}

diesel::table! {
    /// Per-user favourite recipes.
    favorites (user_id, recipe_id) {
        /// Owning user.
        user_id -> Uuid,
        /// Favourited recipe.
        recipe_id -> Uuid,
    }
}

diesel::table! {
    /// Per-user shopping cart entries.
    shopping_cart_items (user_id, recipe_id) {
        /// Owning user.
        user_id -> Uuid,
        /// Carted recipe.
        recipe_id -> Uuid,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(favorites -> users (user_id));
diesel::joinable!(shopping_cart_items -> recipes (recipe_id));
diesel::joinable!(shopping_cart_items -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    subscriptions,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
    favorites,
    shopping_cart_items,
);
