//! Health check HTTP handlers

use axum::{extract::State, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::web::{AppState, responses::ok};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Health check endpoint: liveness plus database connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service health status"))
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match state.database.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "disconnected".to_string()
        }
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    ok(HealthResponse {
        status: status.to_string(),
        database,
    })
}
