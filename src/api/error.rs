//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::identity::IdentityError;
use crate::profiles::ProfileError;
use crate::scheduling::SchedulingError;
use crate::store::StoreError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// The primary write landed but a fan-out write failed.
    #[error("Fan-out failed: {0}")]
    FanOutFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Non authentifié".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "SLOT_TAKEN", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::FanOutFailed(detail) => {
                tracing::error!(detail, "API fan-out failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FANOUT_FAILED",
                    detail.clone(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Une erreur interne est survenue".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::SlotTaken { .. } => ApiError::Conflict(err.to_string()),
            SchedulingError::DoctorNotFound(_) | SchedulingError::AppointmentNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            SchedulingError::InvalidStatus(_)
            | SchedulingError::InvalidTime(_)
            | SchedulingError::AlreadyDecided(_) => ApiError::BadRequest(err.to_string()),
            SchedulingError::DecisionNotAllowed => ApiError::Forbidden(err.to_string()),
            SchedulingError::NotificationFailed { .. } => ApiError::FanOutFailed(err.to_string()),
            SchedulingError::Store(e) => ApiError::Internal(e.to_string()),
            SchedulingError::Identity(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ProfileError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
