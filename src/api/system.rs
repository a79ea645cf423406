//! Health endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{AppState, HealthResponse, ReadinessChecks, ReadinessResponse};

/// `GET /health`
///
/// Liveness probe; does not touch the database.
pub async fn health_live() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "llm-topix-backend",
    })
}

/// `GET /health/ready`
///
/// Readiness probe backed by a database ping.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = state.article_service.storage_reachable().await;

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: database,
            uptime_secs: state.start_time.elapsed().as_secs(),
            checks: ReadinessChecks { database },
        }),
    )
        .into_response()
}
