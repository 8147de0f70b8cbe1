//! Router construction and server entry point.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::ui::{
    handler::{health_check, server_status, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Listener configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Build the application router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/status", get(server_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until ctrl-c / SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), std::io::Error> {
    let state = Arc::new(AppState::new());

    // Safety net against orphaned empty rooms; rooms are normally deleted
    // the moment their roster empties.
    state.lifecycle.spawn_cleanup_sweep();

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
