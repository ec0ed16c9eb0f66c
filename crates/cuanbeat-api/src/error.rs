//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps storage and validation failures to HTTP status codes and JSON
//! error bodies. Never exposes internal error details in responses —
//! backend faults are logged server-side with full detail and surfaced
//! to clients as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use cuanbeat_core::{FieldProblem, ValidationError};

use crate::storage::StorageError;

/// JSON error response body.
///
/// The `details` field carries the per-field problem list for
/// validation failures and is omitted for every other error class.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Per-field problems, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub details: Option<Vec<FieldProblem>>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Request field validation failed (400). Carries the problem list.
    #[error("invalid data: {0}")]
    Validation(ValidationError),

    /// Request body could not be parsed as the expected JSON (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Operation attempted against an entity not in the required state
    /// (409), e.g. reviewing an already-reviewed submission.
    #[error("{0}")]
    InvalidState(String),

    /// Internal fault (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// Storage backend unreachable (503). Message is logged but not
    /// returned.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Never expose internal error text to clients.
        let (message, details) = match &self {
            Self::Validation(err) => ("Invalid data".to_string(), Some(err.problems().to_vec())),
            Self::BadRequest(msg) => (msg.clone(), None),
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::Unavailable(_) => ("Service temporarily unavailable".to_string(), None),
            other => (other.to_string(), None),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Unavailable(_) => tracing::error!(error = %self, "storage backend unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Map storage failures to HTTP-facing errors.
///
/// Connection-class faults become 503 (the backend may come back);
/// everything else unexpected becomes a generic 500.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            StorageError::InvalidTransition(e) => Self::InvalidState(e.to_string()),
            StorageError::Backend(e) => match &e {
                sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Tls(_) => Self::Unavailable(e.to_string()),
                _ => Self::Internal(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuanbeat_core::StateTransitionError;
    use cuanbeat_core::SubmissionStatus;
    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn validation_returns_400_with_details() {
        let err = AppError::Validation(ValidationError::single(
            "email",
            "must be a valid email address",
        ));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid data");
        let details = body.details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "email");
    }

    #[tokio::test]
    async fn bad_request_returns_400_without_details() {
        let (status, body) = response_parts(AppError::BadRequest("expected JSON".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("expected JSON"));
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let (status, body) = response_parts(AppError::NotFound("Creator not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Creator not found");
    }

    #[tokio::test]
    async fn invalid_state_returns_409() {
        let (status, body) =
            response_parts(AppError::InvalidState("already approved".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.error.contains("already approved"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection string leaked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body.error.contains("connection string"),
            "internal error details must not leak: {}",
            body.error
        );
        assert_eq!(body.error, "An internal error occurred");
    }

    #[tokio::test]
    async fn unavailable_hides_details() {
        let (status, body) =
            response_parts(AppError::Unavailable("10.0.0.3:5432 refused".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.contains("5432"), "got: {}", body.error);
    }

    #[test]
    fn storage_not_found_maps_to_404() {
        let err = AppError::from(StorageError::NotFound("submission 7".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(format!("{err}").contains("submission 7"));
    }

    #[test]
    fn storage_invalid_transition_maps_to_409() {
        let err = AppError::from(StorageError::InvalidTransition(
            StateTransitionError::AlreadyReviewed {
                from: SubmissionStatus::Approved,
                to: SubmissionStatus::Rejected,
            },
        ));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_io_fault_maps_to_503() {
        let io = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let err = AppError::from(StorageError::Backend(io));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn storage_other_fault_maps_to_500() {
        let err = AppError::from(StorageError::Backend(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_skips_absent_details() {
        let body = ErrorBody {
            error: "Song not found".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}
