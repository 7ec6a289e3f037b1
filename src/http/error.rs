//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::ScheduleError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (malformed payload)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Domain error from the scheduling engine
    Schedule(ScheduleError),
}

fn repository_response(e: &RepositoryError) -> (StatusCode, ApiError) {
    if e.is_not_found() {
        (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
    } else if e.is_retryable() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("STORE_UNAVAILABLE", e.to_string())
                .with_details("transient store failure, retry the request"),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("STORE_ERROR", e.to_string()),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Schedule(err) => {
                let status = match &err {
                    // Conflicts the user resolves by picking another
                    // room/slot, or by retrying a publish.
                    ScheduleError::RoomConflict { .. }
                    | ScheduleError::FacultyConflict { .. }
                    | ScheduleError::SlotOccupied { .. }
                    | ScheduleError::TemplateActive { .. }
                    | ScheduleError::VersionNotReady(_) => StatusCode::CONFLICT,
                    // Validation failures in the request itself.
                    ScheduleError::InvalidSlot { .. }
                    | ScheduleError::BreakSlotNotSchedulable { .. }
                    | ScheduleError::InvalidDay { .. }
                    | ScheduleError::InvalidTime(_)
                    | ScheduleError::NoActiveTemplate
                    | ScheduleError::EmptyTemplate => StatusCode::UNPROCESSABLE_ENTITY,
                    ScheduleError::Store(e) => {
                        let (status, body) = repository_response(e);
                        return (status, Json(body)).into_response();
                    }
                };
                (status, ApiError::new(err.code(), err.to_string()))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError::Schedule(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Schedule(ScheduleError::Store(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
