use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::ApiResult,
    state::AppState,
};

use super::dto::{MessageResponse, SheetItem, SheetListItem};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/sheet/all", get(list_sheets))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/sheet/add", post(add_sheet))
}

#[instrument(skip(state, payload))]
pub async fn add_sheet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SheetItem>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    state.credentials.require_user(user_id).await?;
    let sheet = state.sheets.add(user_id, payload.into()).await?;
    info!(user_id = %user_id, sheet_id = %sheet.id, "sheet added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Data added",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_sheets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<SheetListItem>>> {
    state.credentials.require_user(user_id).await?;
    let sheets = state.sheets.list_by_user(user_id).await?;
    Ok(Json(sheets.into_iter().map(SheetListItem::from).collect()))
}
