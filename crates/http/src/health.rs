//! Health endpoint polled by the service registry.

use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone)]
struct HealthState {
    service: String,
    version: String,
    started: Instant,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    service: String,
    version: String,
    uptime_seconds: u64,
}

/// Router exposing `GET /health`.
///
/// Mount it outside the authentication layer: the registry polls it without
/// credentials, and a 2xx is what keeps the instance registered.
pub fn health_router(service: impl Into<String>, version: impl Into<String>) -> Router {
    let state = HealthState {
        service: service.into(),
        version: version.into(),
        started: Instant::now(),
    };

    Router::new().route("/health", get(health)).with_state(state)
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        service: state.service.clone(),
        version: state.version.clone(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}
