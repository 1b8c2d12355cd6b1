//! Tag catalogue handlers.
//!
//! ```text
//! GET /api/tags/
//! GET /api/tags/{id}/
//! ```

use actix_web::{get, web};
use uuid::Uuid;

use crate::domain::{Error, Tag};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// List every tag.
#[utoipa::path(
    get,
    path = "/api/tags/",
    responses((status = 200, description = "All tags", body = [Tag])),
    tags = ["catalogue"],
    security([]),
    operation_id = "listTags"
)]
#[get("/tags/")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Tag>>> {
    Ok(web::Json(state.catalogue.list_tags().await?))
}

/// Fetch one tag.
#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Unknown tag", body = Error)
    ),
    tags = ["catalogue"],
    security([]),
    operation_id = "getTag"
)]
#[get("/tags/{id}/")]
pub async fn get_tag(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Tag>> {
    state
        .catalogue
        .tag_by_id(&path.into_inner())
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("tag not found"))
}
