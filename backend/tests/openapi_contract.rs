//! Contract tests over the generated OpenAPI document.
//!
//! These run against the public [`ApiDoc`] export so external tooling that
//! consumes `openapi-dump` output can rely on the shape checked here.

use potluck::ApiDoc;
use rstest::rstest;
use utoipa::OpenApi;

#[rstest]
fn document_serialises_to_json() {
    let json = ApiDoc::openapi().to_json().expect("serialise document");
    assert!(json.contains("\"openapi\""));
    assert!(json.contains("Potluck backend API"));
}

#[rstest]
fn every_path_sits_under_a_known_prefix() {
    let doc = ApiDoc::openapi();
    for path in doc.paths.paths.keys() {
        assert!(
            path.starts_with("/api/") || path.starts_with("/s/") || path.starts_with("/health/"),
            "unexpected path prefix: {path}"
        );
    }
}

#[rstest]
#[case("/api/auth/login/")]
#[case("/api/auth/logout/")]
#[case("/api/users/")]
#[case("/api/users/me/")]
#[case("/api/users/me/avatar/")]
#[case("/api/users/subscriptions/")]
#[case("/api/users/{id}/subscribe/")]
#[case("/api/tags/")]
#[case("/api/tags/{id}/")]
#[case("/api/ingredients/")]
#[case("/api/ingredients/{id}/")]
#[case("/api/recipes/")]
#[case("/api/recipes/download_shopping_cart/")]
#[case("/api/recipes/{id}/")]
#[case("/api/recipes/{id}/favorite/")]
#[case("/api/recipes/{id}/shopping_cart/")]
#[case("/api/recipes/{id}/get-link/")]
#[case("/s/{id}")]
fn documented_paths_cover_the_rest_surface(#[case] path: &str) {
    let doc = ApiDoc::openapi();
    assert!(
        doc.paths.paths.contains_key(path),
        "missing documented path: {path}"
    );
}

#[rstest]
fn session_cookie_security_scheme_is_registered() {
    let doc = ApiDoc::openapi();
    let components = doc.components.expect("components");
    assert!(
        components.security_schemes.contains_key("SessionCookie"),
        "session cookie scheme missing"
    );
}

#[rstest]
#[case("Error")]
#[case("UserProfile")]
#[case("RecipeDetail")]
#[case("RecipePreview")]
#[case("SubscriptionOverview")]
fn shared_response_schemas_are_registered(#[case] name: &str) {
    let doc = ApiDoc::openapi();
    let components = doc.components.expect("components");
    assert!(
        components.schemas.contains_key(name),
        "missing schema: {name}"
    );
}
