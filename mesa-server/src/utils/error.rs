//! Unified HTTP error handling
//!
//! [`AppError`] covers every failure a handler can surface. The wire shape is
//! a stable machine-readable code plus a human message:
//!
//! ```json
//! { "code": "EXPIRED_TOKEN", "message": "QR token expired" }
//! ```
//!
//! # Error codes
//!
//! | Code | Status | Meaning |
//! |------|--------|---------|
//! | INVALID_TOKEN | 401 | token unknown or malformed |
//! | EXPIRED_TOKEN | 401 | token past its expiry |
//! | INACTIVE_TOKEN | 410 | token retired by regeneration or closure |
//! | SESSION_NOT_FOUND | 404 | guest session does not exist |
//! | SESSION_CLOSED | 410 | guest session was invalidated |
//! | TABLE_NOT_FOUND | 404 | table id not in the catalog |
//! | NOT_FOUND | 404 | any other missing resource |
//! | ELIGIBILITY_NOT_MET | 422 | table spend below the song gate |
//! | ILLEGAL_TRANSITION | 409 | state machine rejected the move |
//! | CONFLICT | 409 | concurrent modification |
//! | VALIDATION | 400 | request payload rejected |
//! | INTERNAL | 500 | storage or server fault |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Handler result alias
pub type AppResult<T> = Result<T, AppError>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Token errors ==========
    #[error("Invalid token")]
    /// Token unknown or malformed (401)
    InvalidToken,

    #[error("Token expired")]
    /// Token past its expiry (401)
    ExpiredToken,

    #[error("Token no longer active")]
    /// Token retired by regeneration or account closure (410)
    InactiveToken,

    // ========== Session errors ==========
    #[error("Session not found")]
    /// Guest session does not exist (404)
    SessionNotFound,

    #[error("Session closed")]
    /// Guest session was invalidated (410)
    SessionClosed,

    // ========== Business logic errors ==========
    #[error("Table not found: {0}")]
    /// Table id not in the catalog (404)
    TableNotFound(i64),

    #[error("Resource not found: {0}")]
    /// Any other missing resource (404)
    NotFound(String),

    #[error("Eligibility not met: {0}")]
    /// Table spend below the song gate (422)
    EligibilityNotMet(String),

    #[error("Illegal transition: {0}")]
    /// State machine rejected the move (409)
    IllegalTransition(String),

    #[error("Conflict: {0}")]
    /// Concurrent modification (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// Request payload rejected (400)
    Validation(String),

    // ========== System errors ==========
    #[error("Internal server error: {0}")]
    /// Storage or server fault (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string())
            }
            AppError::ExpiredToken => {
                (StatusCode::UNAUTHORIZED, "EXPIRED_TOKEN", self.to_string())
            }
            AppError::InactiveToken => (StatusCode::GONE, "INACTIVE_TOKEN", self.to_string()),

            AppError::SessionNotFound => {
                (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", self.to_string())
            }
            AppError::SessionClosed => (StatusCode::GONE, "SESSION_CLOSED", self.to_string()),

            AppError::TableNotFound(_) => {
                (StatusCode::NOT_FOUND, "TABLE_NOT_FOUND", self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::EligibilityNotMet(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ELIGIBILITY_NOT_MET",
                self.to_string(),
            ),
            AppError::IllegalTransition(_) => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION", self.to_string())
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION", self.to_string()),

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<crate::orders::StorageError> for AppError {
    fn from(e: crate::orders::StorageError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<crate::sessions::SessionError> for AppError {
    fn from(e: crate::sessions::SessionError) -> Self {
        use crate::sessions::SessionError;
        match e {
            SessionError::InvalidToken => AppError::InvalidToken,
            SessionError::ExpiredToken => AppError::ExpiredToken,
            SessionError::InactiveToken => AppError::InactiveToken,
            SessionError::SessionNotFound => AppError::SessionNotFound,
            SessionError::SessionClosed => AppError::SessionClosed,
            SessionError::TableNotFound(id) => AppError::TableNotFound(id),
            SessionError::Validation(msg) => AppError::Validation(msg),
            SessionError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<crate::services::SongError> for AppError {
    fn from(e: crate::services::SongError) -> Self {
        use crate::services::SongError;
        match e {
            SongError::SongNotFound(id) => AppError::NotFound(format!("song request {id}")),
            SongError::EligibilityNotMet { .. } => AppError::EligibilityNotMet(e.to_string()),
            SongError::IllegalTransition { .. } => AppError::IllegalTransition(e.to_string()),
            SongError::Validation(msg) => AppError::Validation(msg),
            SongError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}
