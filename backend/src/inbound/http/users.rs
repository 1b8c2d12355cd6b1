//! User account, avatar, and subscription handlers.
//!
//! ```text
//! POST   /api/users/
//! GET    /api/users/me/
//! GET    /api/users/me/avatar/
//! PUT    /api/users/me/avatar/
//! DELETE /api/users/me/avatar/
//! GET    /api/users/subscriptions/?recipes_limit=
//! POST   /api/users/{id}/subscribe/?recipes_limit=
//! DELETE /api/users/{id}/subscribe/
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Error, SubscriptionOverview, UserId, UserProfile, hash_password, validate_email,
    validate_name, validate_username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::domain::ports::NewUserRecord;

const PASSWORD_MIN: usize = 8;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email; unique.
    pub email: String,
    /// Public handle; unique.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Avatar reference payload shared by the set and get endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarPayload {
    /// Reference to an already-hosted avatar image.
    pub avatar_url: Option<String>,
}

/// Query parameters controlling the recipe preview in subscription
/// responses.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SubscriptionQuery {
    /// Cap on the number of preview recipes per author.
    pub recipes_limit: Option<i64>,
}

fn preview_limit(query: &SubscriptionQuery) -> Result<Option<i64>, Error> {
    match query.recipes_limit {
        Some(limit) if limit < 0 => {
            Err(Error::invalid_request("recipes_limit must be non-negative"))
        }
        other => Ok(other),
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Validation failure or duplicate email/username", body = Error)
    ),
    tags = ["users"],
    security([]),
    operation_id = "registerUser"
)]
#[post("/users/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        username,
        first_name,
        last_name,
        password,
    } = payload.into_inner();
    validate_email(&email)?;
    validate_username(&username)?;
    validate_name("first_name", &first_name)?;
    validate_name("last_name", &last_name)?;
    if password.chars().count() < PASSWORD_MIN {
        return Err(Error::invalid_request(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }

    let record = state
        .users
        .create(&NewUserRecord {
            email,
            username,
            first_name,
            last_name,
            password_hash: hash_password(&password)?,
        })
        .await?;
    Ok(HttpResponse::Created().json(record.into_profile(false)))
}

/// Fetch the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getOwnProfile"
)]
#[get("/users/me/")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let record = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(record.into_profile(false)))
}

/// Fetch the caller's avatar reference.
#[utoipa::path(
    get,
    path = "/api/users/me/avatar/",
    responses(
        (status = 200, description = "Current avatar reference", body = AvatarPayload),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getAvatar"
)]
#[get("/users/me/avatar/")]
pub async fn get_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AvatarPayload>> {
    let user_id = session.require_user_id()?;
    let record = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(AvatarPayload {
        avatar_url: record.avatar_url,
    }))
}

/// Set the caller's avatar reference.
#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    request_body = AvatarPayload,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarPayload),
        (status = 400, description = "Missing avatar reference", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar/")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarPayload>,
) -> ApiResult<web::Json<AvatarPayload>> {
    let user_id = session.require_user_id()?;
    let avatar_url = payload
        .into_inner()
        .avatar_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("avatar_url must be a non-empty reference"))?;
    state.users.set_avatar(&user_id, &avatar_url).await?;
    Ok(web::Json(AvatarPayload {
        avatar_url: Some(avatar_url),
    }))
}

/// Clear the caller's avatar reference.
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    responses(
        (status = 204, description = "Avatar cleared"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "clearAvatar"
)]
#[delete("/users/me/avatar/")]
pub async fn clear_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.users.clear_avatar(&user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn overview_for(
    state: &HttpState,
    author: crate::domain::ports::UserRecord,
    limit: Option<i64>,
) -> Result<SubscriptionOverview, Error> {
    let (recipes, recipes_count) = state.recipes.previews_for_author(&author.id, limit).await?;
    Ok(SubscriptionOverview {
        author: author.into_profile(true),
        recipes,
        recipes_count,
    })
}

/// List the caller's followed authors with recipe previews.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Followed authors", body = [SubscriptionOverview]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions/")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SubscriptionQuery>,
) -> ApiResult<web::Json<Vec<SubscriptionOverview>>> {
    let user_id = session.require_user_id()?;
    let limit = preview_limit(&query)?;
    let authors = state.subscriptions.followed_authors(&user_id).await?;
    let mut overviews = Vec::with_capacity(authors.len());
    for author in authors {
        overviews.push(overview_for(&state, author, limit).await?);
    }
    Ok(web::Json(overviews))
}

/// Subscribe to an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    params(("id" = Uuid, Path, description = "Author id"), SubscriptionQuery),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionOverview),
        (status = 400, description = "Self or duplicate subscription", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe/")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    query: web::Query<SubscriptionQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let limit = preview_limit(&query)?;
    let author_id = UserId::from_uuid(path.into_inner());
    state.subscriptions.subscribe(&user_id, &author_id).await?;
    let author = state
        .users
        .find_by_id(&author_id)
        .await?
        .ok_or_else(|| Error::not_found("author not found"))?;
    let overview = overview_for(&state, author, limit).await?;
    Ok(HttpResponse::Created().json(overview))
}

/// Unsubscribe from an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not subscribed", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe/")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let author_id = UserId::from_uuid(path.into_inner());
    state
        .subscriptions
        .unsubscribe(&user_id, &author_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
