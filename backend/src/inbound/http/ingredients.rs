//! Ingredient catalogue handlers.
//!
//! ```text
//! GET /api/ingredients/?name=
//! GET /api/ingredients/{id}/
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Error, Ingredient};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for the ingredient listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix filter.
    pub name: Option<String>,
}

/// List ingredients, optionally filtered by name prefix.
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    params(IngredientListQuery),
    responses((status = 200, description = "Matching ingredients", body = [Ingredient])),
    tags = ["catalogue"],
    security([]),
    operation_id = "listIngredients"
)]
#[get("/ingredients/")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    query: web::Query<IngredientListQuery>,
) -> ApiResult<web::Json<Vec<Ingredient>>> {
    Ok(web::Json(
        state
            .catalogue
            .list_ingredients(query.name.as_deref())
            .await?,
    ))
}

/// Fetch one ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = Ingredient),
        (status = 404, description = "Unknown ingredient", body = Error)
    ),
    tags = ["catalogue"],
    security([]),
    operation_id = "getIngredient"
)]
#[get("/ingredients/{id}/")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Ingredient>> {
    state
        .catalogue
        .ingredient_by_id(&path.into_inner())
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("ingredient not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::test_utils::StubState;

    fn test_app(
        stub: &Arc<StubState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new().app_data(stub.http_state()).service(
            web::scope("/api")
                .service(list_ingredients)
                .service(get_ingredient),
        )
    }

    #[actix_web::test]
    async fn name_filter_is_case_insensitive_prefix() {
        let stub = Arc::new(StubState::default());
        stub.seed_ingredient("Flour", "g");
        stub.seed_ingredient("flaked almonds", "g");
        stub.seed_ingredient("salt", "g");
        let app = test::init_service(test_app(&stub)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/ingredients/?name=fl")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn listing_without_filter_returns_everything() {
        let stub = Arc::new(StubState::default());
        stub.seed_ingredient("Flour", "g");
        stub.seed_ingredient("salt", "g");
        let app = test::init_service(test_app(&stub)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/ingredients/").to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn fetches_ingredient_with_unit() {
        let stub = Arc::new(StubState::default());
        let id = stub.seed_ingredient("Flour", "g");
        let app = test::init_service(test_app(&stub)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/ingredients/{id}/"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("measurement_unit").and_then(Value::as_str),
            Some("g")
        );
    }
}
