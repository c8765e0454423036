use accounts_auth::{
    AuthError, Identity, LoginOutcome, NewUser, PublicUser, USERNAME_TAKEN, User, UserId,
    password,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use super::payload::{LoginRequest, RegisterRequest, UpdateRequest};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::extract::Payload;
use crate::server::AppState;

/// Methods served on `/api/accounts/` and `/api/accounts/login/`.
pub const COLLECTION_ALLOW: &str = "POST, OPTIONS";

/// Methods served on `/api/accounts/{id}/`.
pub const DETAIL_ALLOW: &str = "GET, PUT, PATCH, DELETE, HEAD, OPTIONS";

/// Response body of a successful registration.
#[derive(Debug, Serialize)]
pub struct Registered {
    pub username: String,
}

/// `POST /api/accounts/`
pub async fn register(
    State(state): State<AppState>,
    body: Result<Payload<RegisterRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Registered>)> {
    let Payload(body) = body?;
    let registration = body.validate()?;

    if state
        .users
        .find_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(FieldErrors::single("username", USERNAME_TAKEN).into());
    }

    let hash = password::hash_password_blocking(registration.password).await?;
    let user = state
        .users
        .create(NewUser::new(registration.username, hash))
        .await
        .map_err(username_conflict)?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Registered {
            username: user.username,
        }),
    ))
}

/// `POST /api/accounts/login/`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Payload<LoginRequest>, ApiError>,
) -> ApiResult<Json<LoginOutcome>> {
    let Payload(body) = body?;
    let (username, password) = body.validate()?;
    let outcome = state.credentials.validate(&username, &password).await?;
    Ok(Json(outcome))
}

/// `GET /api/accounts/{id}/`
pub async fn retrieve(
    State(state): State<AppState>,
    identity: Identity,
    method: Method,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let user = load_account(&state, &id).await?;
    state.guard.ensure(identity.user_id(), user.id, &method)?;
    Ok(Json(user.to_public()))
}

/// `PUT`/`PATCH /api/accounts/{id}/`
///
/// Both methods apply a partial update. The body is only read once the
/// caller is known to own the account.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    method: Method,
    Path(id): Path<String>,
    body: Result<Payload<UpdateRequest>, ApiError>,
) -> ApiResult<Json<PublicUser>> {
    let user = load_account(&state, &id).await?;
    state.guard.ensure(identity.user_id(), user.id, &method)?;

    let Payload(body) = body?;
    let update = body.validate()?;
    let updated = state.users.update(user.id, &update).await?;
    tracing::info!(user_id = %updated.id, "profile updated");
    Ok(Json(updated.to_public()))
}

/// `DELETE /api/accounts/{id}/`
pub async fn destroy(
    State(state): State<AppState>,
    identity: Identity,
    method: Method,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user = load_account(&state, &id).await?;
    state.guard.ensure(identity.user_id(), user.id, &method)?;
    state.users.delete(user.id).await?;
    tracing::info!(user_id = %user.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `OPTIONS /api/accounts/` and `/api/accounts/login/`
pub async fn collection_options() -> impl IntoResponse {
    options_response(COLLECTION_ALLOW)
}

/// `OPTIONS /api/accounts/{id}/`
pub async fn detail_options(
    State(state): State<AppState>,
    identity: Identity,
    method: Method,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = load_account(&state, &id).await?;
    state.guard.ensure(identity.user_id(), user.id, &method)?;
    Ok(options_response(DETAIL_ALLOW))
}

fn options_response(allow: &'static str) -> impl IntoResponse {
    let body = json!({
        "renders": ["application/json"],
        "parses": ["application/json", "application/x-www-form-urlencoded"],
    });
    ([(header::ALLOW, allow)], Json(body))
}

/// An id that does not parse is as unknown as one that is not stored.
async fn load_account(state: &AppState, id: &str) -> ApiResult<User> {
    let id: UserId = id.parse().map_err(|_| AuthError::not_found("User"))?;
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AuthError::not_found("User").into())
}

/// A concurrent registration can still win the race after the lookup.
fn username_conflict(err: AuthError) -> ApiError {
    match err {
        AuthError::Conflict { message } => FieldErrors::single("username", message).into(),
        other => other.into(),
    }
}
