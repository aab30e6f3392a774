//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: BackendHealth,
    pub active_sessions: usize,
}

/// Backend (data source) reachability.
#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports backend reachability and version. Responds 503 when the backend
/// cannot be reached, with the same body.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let ping = state.data_source.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let backend = match ping {
        Ok(()) => BackendHealth {
            connected: true,
            latency_ms: Some(latency_ms),
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Backend health check failed");
            BackendHealth {
                connected: false,
                latency_ms: None,
                error: Some(err.to_string()),
            }
        }
    };

    let status = if backend.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if backend.connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend,
        active_sessions: state.sessions.len().await,
    };

    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the backend answers a ping.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match state.data_source.ping().await {
        Ok(()) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
