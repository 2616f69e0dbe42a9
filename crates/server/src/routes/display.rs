use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{
    domain::{CategoryId, PerformerId},
    error::ApiError,
    protocol::{
        DisplaySelection, DisplayTypeRequest, DisplayView, MessageResponse,
        OverridePerformerRequest,
    },
};

use super::{http_error, HttpResult};
use crate::app_state::AppState;

pub(super) async fn current(State(state): State<Arc<AppState>>) -> HttpResult<Json<DisplayView>> {
    let view = control_api::current_view(&state.api)
        .await
        .map_err(http_error)?;
    Ok(Json(view))
}

pub(super) async fn next_performer(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<DisplaySelection>> {
    let selection = control_api::advance(&state.api)
        .await
        .map_err(http_error)?;
    state.announce_display().await;
    Ok(Json(selection))
}

pub(super) async fn override_performer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OverridePerformerRequest>,
) -> HttpResult<Json<DisplaySelection>> {
    let performer_id = control_api::required_integer(req.performer_id, "performerId")
        .map_err(http_error)?;
    let selection = control_api::override_current_performer(&state.api, PerformerId(performer_id))
        .await
        .map_err(http_error)?;
    state.announce_display().await;
    Ok(Json(selection))
}

pub(super) async fn change_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> HttpResult<Json<DisplaySelection>> {
    let selection = control_api::set_category(&state.api, CategoryId(category_id))
        .await
        .map_err(http_error)?;
    state.announce_display().await;
    Ok(Json(selection))
}

pub(super) async fn change_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DisplayTypeRequest>,
) -> HttpResult<Json<MessageResponse>> {
    let display_type = req
        .display_type
        .ok_or_else(|| http_error(ApiError::validation("displayType is required")))?;
    let pointer = control_api::switch_display_type(&state.api, &display_type)
        .await
        .map_err(http_error)?;
    state.announce_display().await;
    Ok(Json(MessageResponse::new(format!(
        "Display type changed to {}",
        pointer.mode.as_str()
    ))))
}
