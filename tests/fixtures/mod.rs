//! Shared test fixtures for integration tests.

use std::sync::Arc;

use nazotoki_server::ui::{runner::build_router, state::AppState};

/// A server instance bound to a fixed local port for one test.
pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Bind the listener and serve the app in a background task. The bind
    /// completes before this returns, so clients may connect immediately.
    pub async fn start(port: u16) -> Self {
        let state = Arc::new(AppState::new());
        state.lifecycle.spawn_cleanup_sweep();
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("failed to bind test port");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });
        Self { port }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}
