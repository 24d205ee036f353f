//! Health and metrics routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

/// Liveness message kept stable for existing monitors
pub const ROOT_STATUS: &str = "Claim Denial Risk API is running";

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_path: Option<String>,
    /// Columns after one-hot encoding
    pub feature_count: usize,
    pub decision_threshold: f64,
}

/// `GET /`
pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": ROOT_STATUS }))
}

/// `GET /api/v1/health`
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine = &state.engine;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_path: engine.model_path().map(|p| p.display().to_string()),
        feature_count: engine.pipeline().first.second.width(),
        decision_threshold: engine.threshold(),
    })
}

/// `GET /metrics` in Prometheus text format
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
