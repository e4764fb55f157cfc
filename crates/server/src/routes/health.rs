use crate::error::{ServerError, ServerResult};
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "vidcred-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let metadata = ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
        analyzer: state.pipeline.analyzer_name().to_string(),
        fingerprint_bits: state.pipeline.bit_width(),
    };

    Ok(Json(json!({
        "status": "ready",
        "service": "vidcred-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "pipeline": serde_json::to_value(metadata)
            .map_err(|e| ServerError::Internal(e.to_string()))?,
    })))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound);
    }
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
