//! Autopilot error types with HTTP status code mapping.
//!
//! [`AutopilotError`] is the central error type for the service. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response, so a webhook caller of the auto-pull endpoint always learns
//! why its request was refused.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "authentication failed: token mismatch",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000-1999 | Validation        | 400 Bad Request              |
/// | 2000-2999 | Access            | 401 Unauthorized / 403 / 409 |
/// | 3000-3999 | Server            | 500 Internal Server Error    |
/// | 4000-4999 | Collaborator      | 502 Bad Gateway / 504        |
#[derive(Debug, thiserror::Error)]
pub enum AutopilotError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Auto-pull is not enabled for this working tree.
    #[error("access denied: auto-pull is not enabled")]
    AccessDenied,

    /// The presented remote token did not match the stored token.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Another backup or sync cycle currently holds the working tree.
    #[error("a cycle is already running for {0}")]
    CycleInProgress(String),

    /// Commit record with the given ID was not found.
    #[error("commit record not found: {0}")]
    RecordNotFound(uuid::Uuid),

    /// The version-control subsystem failed.
    #[error("version control error: {0}")]
    VersionControl(String),

    /// The database backup subsystem failed.
    #[error("database backup error: {0}")]
    Database(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A collaborator call exceeded its time budget.
    #[error("{operation} timed out after {secs} s")]
    Timeout {
        /// Name of the collaborator operation that timed out.
        operation: &'static str,
        /// Configured time budget in seconds.
        secs: u64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AutopilotError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::AuthenticationFailed(_) => 2001,
            Self::AccessDenied => 2002,
            Self::CycleInProgress(_) => 2003,
            Self::RecordNotFound(_) => 2004,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::VersionControl(_) => 4001,
            Self::Database(_) => 4002,
            Self::Timeout { .. } => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::CycleInProgress(_) => StatusCode::CONFLICT,
            Self::RecordNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::VersionControl(_) | Self::Database(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<sqlx::Error> for AutopilotError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for AutopilotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
