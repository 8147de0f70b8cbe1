//! HTTP API endpoint handlers.
//!
//! Process bootstrap surfaces only; all game traffic goes over WebSocket.

use axum::Json;

use crate::{
    common::time::{get_jst_timestamp, timestamp_to_jst_rfc3339},
    infrastructure::dto::http::{HealthDto, ServerStatusDto},
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        timestamp: timestamp_to_jst_rfc3339(get_jst_timestamp()),
    })
}

/// Server status endpoint
pub async fn server_status() -> Json<ServerStatusDto> {
    Json(ServerStatusDto {
        message: "Guessing game server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
