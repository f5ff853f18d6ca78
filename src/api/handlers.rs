//! Service Handlers
//!
//! Shared application state plus the health, status, and metrics endpoints.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, Json};

use super::models::{HealthResponse, StatusResponse};
use crate::metrics::MetricsRegistry;
use crate::settlement::SettlementManager;

/// Shared application state
pub struct AppState {
    pub settlement: SettlementManager,
    pub metrics: Arc<MetricsRegistry>,
    /// Balance granted to new players when the request does not name one.
    pub starting_balance_cents: i64,
    pub version: String,
}

/// Health check handler - minimal response time
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// Service status
/// GET /status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "stakehouse".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.metrics.uptime_seconds(),
    })
}

/// Prometheus metrics export
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.to_prometheus_format().await;
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
