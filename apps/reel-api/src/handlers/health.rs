//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// Reports the process as up, plus whether the store answers.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = if state.db().health_check().await {
        "connected"
    } else {
        "unreachable"
    };

    Json(HealthStatus {
        status: "OK",
        database,
        timestamp: Utc::now().to_rfc3339(),
    })
}
