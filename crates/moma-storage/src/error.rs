//! Storage error types for moma-storage.
//!
//! [`StorageError`] is the StoreOperationFailed side of the error model: it
//! wraps backing-engine failures and is terminal for the call that raised
//! it. A query or update that matches nothing is not an error.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite engine reported a failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A schema migration could not be applied.
    #[error("migration error: {0}")]
    Migration(String),

    /// A label or relationship token cannot be turned into a store
    /// identifier.
    #[error("invalid identifier {token:?}: {reason}")]
    InvalidIdentifier { token: String, reason: String },
}
