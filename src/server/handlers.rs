//! Request handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: Option<String>,
}

/// POST /api/command
///
/// The processor decides the status code; this handler only rejects
/// requests with nothing to process.
pub async fn run_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Response {
    let command = request.command.unwrap_or_default();
    if command.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Command is required"})),
        )
            .into_response();
    }

    let response = state.processor.handle(&command).await;
    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::OK);
    (status, Json(response)).into_response()
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
