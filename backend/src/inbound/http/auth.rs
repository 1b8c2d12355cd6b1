//! Session login and logout handlers.
//!
//! ```text
//! POST /api/auth/login/
//! POST /api/auth/logout/
//! ```
//!
//! Credentials are checked against the stored argon2 hash; a successful
//! login persists the user id in the session cookie.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, UserProfile, verify_password};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

// One message for both unknown email and wrong password so the endpoint
// does not disclose which accounts exist.
fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

/// Verify credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserProfile),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    security([]),
    operation_id = "login"
)]
#[post("/auth/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = state
        .users
        .credentials_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !verify_password(&password, &credentials.password_hash)? {
        return Err(invalid_credentials());
    }
    session.persist_user(&credentials.user_id)?;
    let record = state
        .users
        .find_by_id(&credentials.user_id)
        .await?
        .ok_or_else(|| Error::internal("authenticated user record missing"))?;
    Ok(web::Json(record.into_profile(false)))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/auth/logout/",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "No active session", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout/")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
