use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level error taxonomy. Every pipeline stage maps its failures into
/// one of these before reaching the handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("error fetching schema: {0}")]
    SchemaFetch(String),

    /// User text or generated SQL tripped a safety heuristic.
    #[error("{0}")]
    GenerationRejected(String),

    #[error("error generating SQL: {0}")]
    GenerationBackend(String),

    #[error("generated SQL query is not a read-only SELECT statement")]
    ValidationRejected,

    #[error("SQL execution failed: {0}")]
    Execution(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_)
            | AppError::SchemaFetch(_)
            | AppError::GenerationBackend(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GenerationRejected(_)
            | AppError::ValidationRejected
            | AppError::Execution(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("request failed ({}): {}", status.as_u16(), self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
