//! Core error types for moma-core.
//!
//! The mapper and validator are total over well-formed input: missing
//! identifiers and unknown encodings are reported as
//! [`ConversionIssue`](crate::mapper::ConversionIssue)s and schema violations
//! as a [`ValidationReport`](crate::schema::ValidationReport). [`CoreError`]
//! only covers input that cannot be decoded at all.

use thiserror::Error;

/// Core errors produced by the moma-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input could not be decoded as a dataset-description document.
    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),

    /// The input could not be decoded as a PG-JSON graph.
    #[error("malformed PG-JSON graph: {0}")]
    Graph(serde_json::Error),
}
