//! HTTP surface: health check and the WebSocket endpoint.

use crate::domains::presence::PresenceCoordinator;
use axum::{routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::websocket::ws_handler;

#[derive(Clone)]
pub struct GatewayState {
    pub coordinator: Arc<PresenceCoordinator>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// | Method | Path      | Description               |
/// |--------|-----------|---------------------------|
/// | GET    | `/health` | Liveness probe            |
/// | WS     | `/ws`     | Driver event stream       |
pub fn create_router(coordinator: Arc<PresenceCoordinator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(GatewayState { coordinator })
}
