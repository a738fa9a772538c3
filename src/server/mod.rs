//! HTTP surface - a thin axum layer over the command processor

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::command::CommandProcessor;
use crate::core::error::Result;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<CommandProcessor>,
    pub session_token: Option<String>,
}

impl AppState {
    pub fn new(processor: Arc<CommandProcessor>, session_token: Option<String>) -> Self {
        Self {
            processor,
            session_token,
        }
    }
}

/// Build the application router
///
/// The health route sits outside the session gate so probes work
/// without credentials.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/command", post(handlers::run_command))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ))
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(listen_addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);
    let listener = TcpListener::bind(listen_addr).await?;
    info!(address = %listen_addr, "rolegate listening");
    axum::serve(listener, app).await?;
    Ok(())
}
