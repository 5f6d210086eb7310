//! Error types for the calendar server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{backend::BackendError, models::FieldErrors};

/// Stable error codes exposed to calendar clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    BadValue = 2,
    NotFound = 3,
    BookingConflict = 4,
    BookingRejected = 5,
    SubmissionInProgress = 6,
    UpstreamFailure = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Client-side input validation, keyed by form field
    #[error("Invalid booking: {} field error(s)", .0.len())]
    InvalidFields(FieldErrors),

    /// The conflict oracle refused the time range
    #[error("{0}")]
    Conflict(String),

    /// The request was refused by a business rule
    #[error("{0}")]
    Rejected(String),

    #[error("A submission is already in progress")]
    Busy,

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Field-keyed validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut message = self.to_string();
        let (status, code, fields) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, None),
            AppError::InvalidFields(fields) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BadValue, Some(fields))
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::BookingConflict, None),
            AppError::Rejected(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BookingRejected, None)
            }
            AppError::Busy => (StatusCode::CONFLICT, ErrorCode::SubmissionInProgress, None),
            AppError::Backend(ref e) => {
                tracing::error!("Backend error: {}", e);
                (StatusCode::BAD_GATEWAY, ErrorCode::UpstreamFailure, None)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                message = "Internal server error".to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure, None)
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
