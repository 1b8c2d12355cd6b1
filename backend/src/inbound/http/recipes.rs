//! Recipe handlers: CRUD, favourites, shopping cart, short links, and the
//! shopping-list download.
//!
//! ```text
//! GET    /api/recipes/?author=&tags=&is_favorited=&is_in_shopping_cart=
//! POST   /api/recipes/
//! GET    /api/recipes/download_shopping_cart/
//! GET    /api/recipes/{id}/
//! PATCH  /api/recipes/{id}/        (PUT accepted as an alias)
//! DELETE /api/recipes/{id}/
//! POST   /api/recipes/{id}/favorite/     DELETE removes
//! POST   /api/recipes/{id}/shopping_cart/ DELETE removes
//! GET    /api/recipes/{id}/get-link/
//! GET    /s/{id}                   (root scope redirect)
//! ```
//!
//! `download_shopping_cart` must be registered before the `{id}` routes so
//! the literal segment is not captured as a recipe id.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, route, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{MembershipKind, RecipeQueryFilter};
use crate::domain::{
    Error, IngredientAmount, RecipeDetail, RecipeDraft, RecipePreview, UserId, render_report,
    report_filename,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Recipe create/update request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecipePayload {
    /// Recipe title.
    pub name: String,
    /// Free-text preparation instructions.
    pub body: String,
    /// Cooking time in minutes; must be positive.
    pub cooking_time_minutes: i32,
    /// Reference to an already-hosted image.
    pub image_url: String,
    /// Tag ids; at least one required.
    pub tags: Vec<Uuid>,
    /// Ingredient entries; at least one required, positive amounts.
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipePayload {
    fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            name: self.name,
            body: self.body,
            cooking_time_minutes: self.cooking_time_minutes,
            image_url: self.image_url,
            tag_ids: self.tags,
            ingredients: self.ingredients,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::invalid_request(format!(
            "{key} must be one of 1, 0, true, false"
        ))),
    }
}

// Repeated `tags=` keys rule out a plain deserialized struct here; unknown
// keys are ignored the way the listing always has.
fn parse_list_filter(pairs: &[(String, String)]) -> Result<RecipeQueryFilter, Error> {
    let mut filter = RecipeQueryFilter::default();
    for (key, value) in pairs {
        match key.as_str() {
            "author" => {
                filter.author = Some(
                    UserId::parse(value)
                        .map_err(|_| Error::invalid_request("author must be a valid UUID"))?,
                );
            }
            "tags" => filter.tag_slugs.push(value.clone()),
            "is_favorited" => filter.is_favorited = parse_flag(key, value)?,
            "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(key, value)?,
            _ => {}
        }
    }
    Ok(filter)
}

async fn require_author(
    state: &HttpState,
    recipe_id: &Uuid,
    user_id: &UserId,
) -> Result<(), Error> {
    let author = state
        .recipes
        .author_id(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("recipe not found"))?;
    if author != *user_id {
        return Err(Error::forbidden("only the author may modify a recipe"));
    }
    Ok(())
}

/// List recipes, newest first, with optional filters.
#[utoipa::path(
    get,
    path = "/api/recipes/",
    params(
        ("author" = Option<Uuid>, Query, description = "Only recipes by this author"),
        ("tags" = Option<String>, Query, description = "Tag slug filter, repeatable"),
        ("is_favorited" = Option<String>, Query, description = "Only the viewer's favourites"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "Only the viewer's cart")
    ),
    responses(
        (status = 200, description = "Matching recipes", body = [RecipeDetail]),
        (status = 401, description = "Viewer filter without a session", body = Error)
    ),
    tags = ["recipes"],
    security([]),
    operation_id = "listRecipes"
)]
#[get("/recipes/")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<web::Json<Vec<RecipeDetail>>> {
    let viewer = session.user_id()?;
    let filter = parse_list_filter(&query.into_inner())?;
    if (filter.is_favorited || filter.is_in_shopping_cart) && viewer.is_none() {
        return Err(Error::unauthorized("login required"));
    }
    let recipes = state.recipes.list(&filter, viewer.as_ref()).await?;
    Ok(web::Json(recipes))
}

/// Create a recipe.
#[utoipa::path(
    post,
    path = "/api/recipes/",
    request_body = RecipePayload,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetail),
        (status = 400, description = "Validation failure or unknown tag/ingredient", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes/")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipePayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = payload.into_inner().into_draft().validate()?;
    let detail = state.recipes.create(&user_id, &draft).await?;
    Ok(HttpResponse::Created().json(detail))
}

/// Download the aggregated shopping list as a plain-text attachment.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    responses(
        (status = 200, description = "Plain-text shopping list", content_type = "text/plain"),
        (status = 400, description = "Shopping cart is empty", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart/")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let record = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    let lines = state.shopping_list.aggregate(&user_id).await?;
    if lines.is_empty() {
        return Err(Error::invalid_request("shopping cart is empty"));
    }
    let filename = report_filename(&record.username);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(render_report(lines)))
}

/// Fetch one recipe with viewer-dependent flags.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetail),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    security([]),
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}/")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RecipeDetail>> {
    let viewer = session.user_id()?;
    state
        .recipes
        .fetch(&path.into_inner(), viewer.as_ref())
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("recipe not found"))
}

/// Replace a recipe's fields, tag set, and ingredient set.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = RecipePayload,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeDetail),
        (status = 400, description = "Validation failure or unknown tag/ingredient", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[route("/recipes/{id}/", method = "PATCH", method = "PUT")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RecipePayload>,
) -> ApiResult<web::Json<RecipeDetail>> {
    let user_id = session.require_user_id()?;
    let recipe_id = path.into_inner();
    require_author(&state, &recipe_id, &user_id).await?;
    let draft = payload.into_inner().into_draft().validate()?;
    state.recipes.update(&recipe_id, &draft).await?;
    // Re-read so favourite/cart flags reflect the caller.
    state
        .recipes
        .fetch(&recipe_id, Some(&user_id))
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("recipe not found"))
}

/// Delete a recipe.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}/")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let recipe_id = path.into_inner();
    require_author(&state, &recipe_id, &user_id).await?;
    state.recipes.delete(&recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_membership(
    state: &HttpState,
    session: &SessionContext,
    recipe_id: Uuid,
    kind: MembershipKind,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let preview = state.memberships.add(kind, &user_id, &recipe_id).await?;
    Ok(HttpResponse::Created().json(preview))
}

async fn remove_membership(
    state: &HttpState,
    session: &SessionContext,
    recipe_id: Uuid,
    kind: MembershipKind,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.memberships.remove(kind, &user_id, &recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a recipe to the caller's favourites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to favourites", body = RecipePreview),
        (status = 400, description = "Already favourited", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite/")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    add_membership(&state, &session, path.into_inner(), MembershipKind::Favorite).await
}

/// Remove a recipe from the caller's favourites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from favourites"),
        (status = 400, description = "Not favourited", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite/")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    remove_membership(&state, &session, path.into_inner(), MembershipKind::Favorite).await
}

/// Add a recipe to the caller's shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to the cart", body = RecipePreview),
        (status = 400, description = "Already in the cart", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart/")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    add_membership(
        &state,
        &session,
        path.into_inner(),
        MembershipKind::ShoppingCart,
    )
    .await
}

/// Remove a recipe from the caller's shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from the cart"),
        (status = 400, description = "Not in the cart", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart/")]
pub async fn remove_from_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    remove_membership(
        &state,
        &session,
        path.into_inner(),
        MembershipKind::ShoppingCart,
    )
    .await
}

/// Short-link response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    /// Absolute short link for the recipe.
    pub short_link: String,
}

/// Return an absolute short link for an existing recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link/",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    security([]),
    operation_id = "getRecipeLink"
)]
#[get("/recipes/{id}/get-link/")]
pub async fn get_link(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let recipe_id = path.into_inner();
    if state.recipes.author_id(&recipe_id).await?.is_none() {
        return Err(Error::not_found("recipe not found"));
    }
    let info = request.connection_info();
    Ok(web::Json(ShortLinkResponse {
        short_link: format!("{}://{}/s/{recipe_id}", info.scheme(), info.host()),
    }))
}

/// Redirect a short link to the recipe page path.
#[utoipa::path(
    get,
    path = "/s/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 301, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    security([]),
    operation_id = "resolveShortLink"
)]
#[get("/s/{id}")]
pub async fn resolve_short_link(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let recipe_id = path.into_inner();
    if state.recipes.author_id(&recipe_id).await?.is_none() {
        return Err(Error::not_found("recipe not found"));
    }
    Ok(HttpResponse::MovedPermanently()
        .insert_header((header::LOCATION, format!("/recipes/{recipe_id}/")))
        .finish())
}
