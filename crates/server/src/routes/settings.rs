use std::sync::Arc;

use axum::{extract::State, Json};
use shared::{
    protocol::{MessageResponse, SetSettingRequest},
    settings::Setting,
};

use super::{http_error, HttpResult};
use crate::app_state::AppState;

pub(super) async fn list(State(state): State<Arc<AppState>>) -> HttpResult<Json<Vec<Setting>>> {
    let settings = control_api::list_settings(&state.api)
        .await
        .map_err(http_error)?;
    Ok(Json(settings))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetSettingRequest>,
) -> HttpResult<Json<Setting>> {
    let setting = control_api::update_setting(&state.api, req)
        .await
        .map_err(http_error)?;
    state.announce_settings();
    if setting.key.is_pointer() {
        state.announce_display().await;
    }
    Ok(Json(setting))
}

pub(super) async fn reset(State(state): State<Arc<AppState>>) -> HttpResult<Json<MessageResponse>> {
    control_api::reset_settings(&state.api)
        .await
        .map_err(http_error)?;
    state.announce_settings();
    Ok(Json(MessageResponse::new("Settings reset to defaults")))
}
