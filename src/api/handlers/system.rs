//! System endpoints: health check and the schedule table.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ScheduleDto;
use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /schedules`: Cadences accepted by `automatic-backups`.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    tag = "System",
    summary = "List backup cadences",
    description = "Returns every cadence the scheduler can fire, including registered extensions such as `weekly`.",
    responses(
        (status = 200, description = "Cadence table", body = Vec<ScheduleDto>),
    )
)]
pub async fn schedules_handler(State(state): State<AppState>) -> impl IntoResponse {
    let schedules: Vec<ScheduleDto> = state
        .schedules
        .iter()
        .map(|(name, definition)| ScheduleDto {
            name: name.clone(),
            interval_secs: definition.interval_secs,
            display: definition.display.clone(),
        })
        .collect();
    Json(schedules)
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// System routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/schedules", get(schedules_handler))
}
