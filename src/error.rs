use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No student is registered with this RFID card")]
    RfidNotFound,

    #[error("No active session for this student right now")]
    NoActiveSession,

    #[error("Face does not match the stored embedding")]
    FaceMismatch,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Attendance data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Could not record attendance: {0}")]
    RecordingFailed(String),
}

impl AppError {
    /// Stable machine-readable code the kiosk and dashboard switch on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Migration(_) => "database_error",
            AppError::Config(_) => "config_error",
            AppError::NotFound => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::RfidNotFound => "rfid_not_found",
            AppError::NoActiveSession => "no_active_session",
            AppError::FaceMismatch => "face_mismatch",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::DataUnavailable(_) => "data_unavailable",
            AppError::RecordingFailed(_) => "recording_failed",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::RfidNotFound => (
                StatusCode::NOT_FOUND,
                "Card not recognized. Please contact your instructor for enrollment.".to_string(),
            ),
            AppError::NoActiveSession => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "There is no active check-in session for you right now.".to_string(),
            ),
            AppError::FaceMismatch => (
                StatusCode::FORBIDDEN,
                "Face not recognized. Please return the card to its owner.".to_string(),
            ),
            AppError::SessionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Session {} not found", id))
            }
            AppError::DataUnavailable(msg) => {
                warn!("report data unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::RecordingFailed(msg) => {
                error!("attendance recording failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not record attendance: {}", msg),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            code: code.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
