//! Cycle triggers: the auto-pull webhook and on-demand backups.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{AutopullParams, AutopullResponse, BackupResponse};
use crate::app_state::AppState;
use crate::error::{AutopilotError, ErrorResponse};

/// `POST /autopull`: Webhook that pulls new commits from the remote.
///
/// # Errors
///
/// Returns [`AutopilotError`] when auto-pull is disabled, the token is
/// rejected, another cycle is running, or a collaborator fails.
#[utoipa::path(
    post,
    path = "/api/v1/autopull",
    tag = "Cycles",
    summary = "Pull new commits from the remote",
    description = "Authenticates the presented token, discards local changes, fetches, optionally checkpoints the database, and pulls.",
    params(AutopullParams),
    responses(
        (status = 200, description = "Pull finished or nothing to pull", body = AutopullResponse),
        (status = 401, description = "Token rejected", body = ErrorResponse),
        (status = 403, description = "Auto-pull is disabled", body = ErrorResponse),
        (status = 409, description = "Another cycle is running", body = ErrorResponse),
        (status = 502, description = "Git or database failure", body = ErrorResponse),
    )
)]
pub async fn trigger_autopull(
    State(state): State<AppState>,
    Query(params): Query<AutopullParams>,
) -> Result<impl IntoResponse, AutopilotError> {
    let outcome = state.sync.run_autopull(&params.token).await?;
    Ok(Json(AutopullResponse::from(outcome)))
}

/// `POST /backups`: Runs an automatic backup cycle now.
///
/// # Errors
///
/// Returns [`AutopilotError`] when another cycle is running or the commit
/// or record step fails. Database failures yield a `degraded` body, not an
/// error.
#[utoipa::path(
    post,
    path = "/api/v1/backups",
    tag = "Cycles",
    summary = "Run a backup now",
    description = "Runs one automatic backup cycle with the configured cadence. Returns `skipped` when automatic backups are disabled.",
    responses(
        (status = 200, description = "Backup cycle outcome", body = BackupResponse),
        (status = 409, description = "Another cycle is running", body = ErrorResponse),
        (status = 502, description = "Git failure", body = ErrorResponse),
    )
)]
pub async fn trigger_backup(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AutopilotError> {
    let outcome = state.backup.run_automatic_backup().await?;
    Ok(Json(BackupResponse::from(outcome)))
}

/// Cycle trigger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/autopull", post(trigger_autopull))
        .route("/backups", post(trigger_backup))
}
