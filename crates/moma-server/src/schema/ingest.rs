//! Ingest and validation responses.

use moma_core::{ConversionIssue, ValidationReport};
use moma_storage::IngestStatus;
use serde::Serialize;

/// Response for `POST /ingestProfile2MoMa` and `POST /ingestPgJson`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    /// Always `"success"`; failures use the error envelope.
    pub status: &'static str,
    pub written: IngestStatus,
    /// Problems absorbed while converting a document. Empty for PG-JSON
    /// ingest.
    pub issues: Vec<ConversionIssue>,
    pub validation: ValidationReport,
}

/// Response for `POST /validatePgJson`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub validation: ValidationReport,
}
