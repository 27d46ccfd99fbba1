use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::ingest::IngestError;
use crate::services::spreadsheet::SpreadsheetError;

/// Errors surfaced to HTTP callers as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn request_not_found() -> Self {
        ApiError::NotFound("Request ID not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SpreadsheetError> for ApiError {
    fn from(err: SpreadsheetError) -> Self {
        tracing::error!(error = %err, "Rejected spreadsheet");
        match err {
            SpreadsheetError::Write(_) => ApiError::Internal("Failed to render CSV".to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidRow { .. } | IngestError::DuplicateRequestId => {
                tracing::error!(error = %err, "Upload rejected");
                ApiError::BadRequest(err.to_string())
            }
            IngestError::Database(_) | IngestError::Queue(_) => {
                tracing::error!(error = %err, "Error processing upload");
                ApiError::Internal("Failed to process CSV".to_string())
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error");
        ApiError::Internal("Database error occurred".to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
