//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint of the inbound layer, the shared
//! response schemas, and the session cookie security scheme. The generated
//! specification is exported via `cargo run --bin openapi-dump` for
//! external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Error, ErrorCode, Ingredient, IngredientAmount, RecipeDetail, RecipeIngredient, RecipePreview,
    SubscriptionOverview, Tag, UserProfile,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::recipes::{RecipePayload, ShortLinkResponse};
use crate::inbound::http::users::{AvatarPayload, RegisterRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Potluck backend API",
        description = "Recipe sharing service: accounts, recipes, favourites, \
                       shopping carts, and author subscriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::me,
        crate::inbound::http::users::get_avatar,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::clear_avatar,
        crate::inbound::http::users::list_subscriptions,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::get_tag,
        crate::inbound::http::ingredients::list_ingredients,
        crate::inbound::http::ingredients::get_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_cart,
        crate::inbound::http::recipes::remove_from_cart,
        crate::inbound::http::recipes::get_link,
        crate::inbound::http::recipes::resolve_short_link,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserProfile,
        Tag,
        Ingredient,
        IngredientAmount,
        RecipeDetail,
        RecipeIngredient,
        RecipePreview,
        SubscriptionOverview,
        LoginRequest,
        RegisterRequest,
        AvatarPayload,
        RecipePayload,
        ShortLinkResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Accounts, avatars, and subscriptions"),
        (name = "catalogue", description = "Tag and ingredient catalogue"),
        (name = "recipes", description = "Recipes, favourites, and shopping carts"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_registers_recipe_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/recipes/"));
        assert!(
            doc.paths
                .paths
                .contains_key("/api/recipes/download_shopping_cart/")
        );
        assert!(doc.paths.paths.contains_key("/s/{id}"));
    }
}
