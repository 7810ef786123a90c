//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moma_core::{CoreError, ValidationReport};
use moma_query::QueryError;
use moma_storage::StorageError;
use serde::Serialize;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST").
    pub code: String,
    pub message: String,
    /// Optional structured details (e.g., a validation report).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed document, graph or filter (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Strict schema validation failed (422).
    #[error("schema validation failed")]
    SchemaViolation(Box<ValidationReport>),

    /// Store failure (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::SchemaViolation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_VIOLATION"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.code();
        let detail = match &self {
            ApiError::BadRequest(msg) | ApiError::InternalError(msg) => ApiErrorDetail {
                code: code.to_string(),
                message: msg.clone(),
                details: None,
            },
            ApiError::SchemaViolation(report) => ApiErrorDetail {
                code: code.to_string(),
                message: format!(
                    "{} invalid node(s), {} with unknown labels, {} without labels",
                    report.invalid_nodes.len(),
                    report.unknown_labels.len(),
                    report.nodes_without_labels.len()
                ),
                details: serde_json::to_value(report).ok(),
            },
        };

        if status.is_server_error() {
            tracing::error!(message = %detail.message, "request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::InvalidIdentifier { .. } => ApiError::BadRequest(err.to_string()),
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidFilter(_) => ApiError::BadRequest(err.to_string()),
            QueryError::Storage(err) => err.into(),
        }
    }
}
