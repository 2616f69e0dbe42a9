use std::sync::Arc;

use axum::{
    extract::{ws::Message, DefaultBodyLimit, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::HealthResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{debug, error, warn};

use crate::{
    app_state::AppState,
    config::{Environment, ServerSettings},
};

mod catalog;
mod display;
mod settings;

pub(crate) type HttpError = (StatusCode, Json<ApiError>);
pub(crate) type HttpResult<T> = Result<T, HttpError>;

pub(crate) fn build_router(state: Arc<AppState>, settings: &ServerSettings) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/settings", get(settings::list).post(settings::update))
        .route("/settings/reset", post(settings::reset))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/categories/:id",
            get(catalog::get_category)
                .patch(catalog::rename_category)
                .delete(catalog::delete_category),
        )
        .route(
            "/performers",
            get(catalog::list_performers).post(catalog::create_performer),
        )
        .route("/performers/import", post(catalog::import_roster))
        .route("/performers/export", get(catalog::export_roster))
        .route(
            "/performers/:id",
            get(catalog::get_performer)
                .patch(catalog::update_performer)
                .delete(catalog::delete_performer),
        )
        .route("/display", get(display::current))
        .route("/display/next-performer", post(display::next_performer))
        .route("/display/performer", post(display::override_performer))
        .route(
            "/display/category/:category_id",
            post(display::change_category),
        )
        .route("/display/type", post(display::change_type))
        .route("/ws", get(ws_handler));

    let router = Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .with_state(state);

    match settings.environment {
        Environment::Development => router.layer(CorsLayer::permissive()),
        Environment::Production => router,
    }
}

/// Maps an operation failure onto its HTTP status. Internal failures are
/// logged here since the client only sees the message.
pub(crate) fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidReference | ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    } else {
        debug!(code = ?err.code, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

async fn health(State(state): State<Arc<AppState>>) -> HttpResult<Json<HealthResponse>> {
    match state.api.storage.health_check().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ok".into(),
        })),
        Err(e) => {
            error!(error = %e, "health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(ErrorCode::Internal, "database unavailable")),
            ))
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

/// Pushes every server event to one display or control client. Incoming
/// frames are read only to notice when the client goes away.
async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagged behind events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(e) => {
                    error!(error = %e, "failed to encode server event");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        if matches!(msg, Message::Close(_)) {
            break;
        }
    }

    send_task.abort();
}

#[cfg(test)]
#[path = "../tests/routes_tests.rs"]
mod tests;
