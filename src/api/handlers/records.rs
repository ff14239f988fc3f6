//! Commit record and activity log queries.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{ActivityListResponse, CommitRecordDto, LimitParams, RecordListResponse};
use crate::app_state::AppState;
use crate::domain::RecordId;
use crate::error::{AutopilotError, ErrorResponse};

/// `GET /commits`: Most recent commit records.
///
/// # Errors
///
/// Returns [`AutopilotError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/commits",
    tag = "Records",
    summary = "List commit records",
    params(LimitParams),
    responses(
        (status = 200, description = "Records, newest first", body = RecordListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_commits(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AutopilotError> {
    let records = state.records.list_records(params.clamped()).await?;
    Ok(Json(RecordListResponse::from(records)))
}

/// `GET /commits/degraded`: Backups whose database snapshot is missing.
///
/// # Errors
///
/// Returns [`AutopilotError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/commits/degraded",
    tag = "Records",
    summary = "List degraded backups",
    description = "Records whose code commit succeeded but which never received a database snapshot id.",
    responses(
        (status = 200, description = "Degraded records, newest first", body = RecordListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_degraded(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AutopilotError> {
    let records = state.records.list_degraded().await?;
    Ok(Json(RecordListResponse::from(records)))
}

/// `GET /commits/{id}`: One commit record.
///
/// # Errors
///
/// Returns [`AutopilotError::RecordNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/commits/{id}",
    tag = "Records",
    summary = "Get a commit record",
    params(("id" = Uuid, Path, description = "Record identifier")),
    responses(
        (status = 200, description = "The record", body = CommitRecordDto),
        (status = 404, description = "Unknown record", body = ErrorResponse),
    )
)]
pub async fn get_commit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AutopilotError> {
    let record = state
        .records
        .get_record(RecordId::from_uuid(id))
        .await?
        .ok_or(AutopilotError::RecordNotFound(id))?;
    Ok(Json(CommitRecordDto::from(record)))
}

/// `GET /activity`: Most recent activity log entries.
///
/// # Errors
///
/// Returns [`AutopilotError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/activity",
    tag = "Records",
    summary = "List activity log entries",
    params(LimitParams),
    responses(
        (status = 200, description = "Entries, newest first", body = ActivityListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AutopilotError> {
    let data = state.records.list_activity(params.clamped()).await?;
    Ok(Json(ActivityListResponse {
        count: data.len(),
        data,
    }))
}

/// Record and activity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/commits", get(list_commits))
        .route("/commits/degraded", get(list_degraded))
        .route("/commits/{id}", get(get_commit))
        .route("/activity", get(list_activity))
}
