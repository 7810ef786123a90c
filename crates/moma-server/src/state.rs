//! Application state shared across handlers.
//!
//! The service holds a `rusqlite::Connection`, which is `!Sync`, so it sits
//! behind `tokio::sync::Mutex` and handlers await the lock.

use std::sync::Arc;

use moma_core::SchemaValidator;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::MomaService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<tokio::sync::Mutex<MomaService>>,
    /// Validator applied to every ingested graph.
    pub validator: SchemaValidator,
}

impl AppState {
    /// Creates state backed by the configured SQLite file.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let service = MomaService::new(&config.db_path)?;
        Ok(AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            validator: SchemaValidator::new(config.strict_schema),
        })
    }

    /// Creates state with an in-memory database (for testing).
    pub fn in_memory(strict: bool) -> Result<Self, ApiError> {
        let service = MomaService::in_memory()?;
        Ok(AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            validator: SchemaValidator::new(strict),
        })
    }
}
