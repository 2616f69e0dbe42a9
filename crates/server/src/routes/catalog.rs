use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use shared::{
    domain::{Category, CategoryId, Performer, PerformerId},
    protocol::{
        CategoryRequest, ImportSummary, MessageResponse, PerformerListQuery, PerformerRequest,
    },
};
use tracing::info;

use super::{http_error, HttpResult};
use crate::app_state::AppState;

pub(super) async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<Vec<Category>>> {
    let categories = control_api::list_categories(&state.api)
        .await
        .map_err(http_error)?;
    Ok(Json(categories))
}

pub(super) async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HttpResult<Json<Category>> {
    let category = control_api::get_category(&state.api, CategoryId(id))
        .await
        .map_err(http_error)?;
    Ok(Json(category))
}

pub(super) async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategoryRequest>,
) -> HttpResult<(StatusCode, Json<Category>)> {
    let category = control_api::create_category(&state.api, req)
        .await
        .map_err(http_error)?;
    state.announce_roster(Some(category.id), None);
    Ok((StatusCode::CREATED, Json(category)))
}

pub(super) async fn rename_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> HttpResult<Json<Category>> {
    let category = control_api::rename_category(&state.api, CategoryId(id), req)
        .await
        .map_err(http_error)?;
    state.announce_roster(Some(category.id), None);
    Ok(Json(category))
}

pub(super) async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HttpResult<Json<MessageResponse>> {
    control_api::delete_category(&state.api, CategoryId(id))
        .await
        .map_err(http_error)?;
    state.announce_roster(Some(CategoryId(id)), None);
    state.announce_display().await;
    Ok(Json(MessageResponse::new("Category deleted")))
}

pub(super) async fn list_performers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PerformerListQuery>,
) -> HttpResult<Json<Vec<Performer>>> {
    let performers = control_api::list_performers(&state.api, q.category_id.map(CategoryId))
        .await
        .map_err(http_error)?;
    Ok(Json(performers))
}

pub(super) async fn get_performer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HttpResult<Json<Performer>> {
    let performer = control_api::get_performer(&state.api, PerformerId(id))
        .await
        .map_err(http_error)?;
    Ok(Json(performer))
}

pub(super) async fn create_performer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PerformerRequest>,
) -> HttpResult<(StatusCode, Json<Performer>)> {
    let performer = control_api::create_performer(&state.api, req)
        .await
        .map_err(http_error)?;
    state.announce_roster(Some(performer.category_id), Some(performer.id));
    Ok((StatusCode::CREATED, Json(performer)))
}

pub(super) async fn update_performer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<PerformerRequest>,
) -> HttpResult<Json<Performer>> {
    let performer = control_api::update_performer(&state.api, PerformerId(id), req)
        .await
        .map_err(http_error)?;
    state.announce_roster(Some(performer.category_id), Some(performer.id));
    state.announce_display().await;
    Ok(Json(performer))
}

pub(super) async fn delete_performer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HttpResult<Json<MessageResponse>> {
    control_api::delete_performer(&state.api, PerformerId(id))
        .await
        .map_err(http_error)?;
    state.announce_roster(None, Some(PerformerId(id)));
    state.announce_display().await;
    Ok(Json(MessageResponse::new("Performer deleted")))
}

/// Accepts the raw CSV file as the request body.
pub(super) async fn import_roster(
    State(state): State<Arc<AppState>>,
    body: String,
) -> HttpResult<Json<ImportSummary>> {
    let summary = control_api::import_roster_csv(&state.api, &body)
        .await
        .map_err(http_error)?;
    state.announce_roster(None, None);
    state.announce_display().await;
    Ok(Json(summary))
}

pub(super) async fn export_roster(
    State(state): State<Arc<AppState>>,
) -> HttpResult<impl IntoResponse> {
    let csv = control_api::export_roster_csv(&state.api)
        .await
        .map_err(http_error)?;
    let filename = format!("performers-{}.csv", Utc::now().format("%Y%m%d-%H%M%S"));
    info!(%filename, bytes = csv.len(), "roster exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
