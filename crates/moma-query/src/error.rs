//! Query error types.

use moma_storage::StorageError;
use thiserror::Error;

/// Errors produced by the query engine.
///
/// A query that matches nothing is an empty [`QueryPage`](crate::QueryPage),
/// never an error.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The filter names an unknown type, an unknown MIME type, or a
    /// malformed date.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The store failed while answering the query.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
