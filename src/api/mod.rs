//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints except `/health` are mounted under `/api/v1`. With the
//! `swagger-ui` feature the OpenAPI document is served at
//! `/api-docs/openapi.json` and browsable at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::cycles::trigger_autopull,
        handlers::cycles::trigger_backup,
        handlers::records::list_commits,
        handlers::records::list_degraded,
        handlers::records::get_commit,
        handlers::records::list_activity,
        handlers::system::health_handler,
        handlers::system::schedules_handler,
    ),
    components(schemas(
        dto::AutopullResponse,
        dto::BackupResponse,
        dto::CommitRecordDto,
        dto::RecordListResponse,
        dto::ActivityListResponse,
        dto::ScheduleDto,
        crate::domain::ActivityEntry,
        crate::domain::ActivityCategory,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Cycles", description = "Backup and auto-pull triggers"),
        (name = "Records", description = "Commit records and the activity log"),
        (name = "System", description = "Health and schedule table"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
