use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        services::{is_valid_password, is_valid_username},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    if !is_valid_username(&payload.username) {
        warn!("invalid username");
        return Err(ApiError::BadRequest("Invalid username".into()));
    }
    if !is_valid_password(&payload.password) {
        warn!("invalid password length");
        return Err(ApiError::BadRequest("Invalid password".into()));
    }

    let id = state
        .credentials
        .register(&payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PublicUser {
            id,
            username: payload.username,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user_id = state
        .credentials
        .verify(&payload.username, &payload.password)
        .await?;
    let token = state.tokens.issue(user_id)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state.credentials.require_user(user_id).await?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}
