//! MomaService: the single coordinator between HTTP handlers and the
//! storage and query crates.
//!
//! Handlers run the pure steps (document conversion, schema validation)
//! before taking the service lock; the service only performs store calls.

use moma_core::{PgGraph, SchemaValidator, ValidationReport};
use moma_query::{query_datasets, FilterSpec, QueryPage};
use moma_storage::{DeleteStatus, GraphAdapter, IngestStatus, OverlayStatus, SqliteStore};
use tracing::{debug, warn};

use crate::error::ApiError;

pub struct MomaService {
    adapter: GraphAdapter<SqliteStore>,
}

impl MomaService {
    /// Opens (or creates) the SQLite database at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        let store = SqliteStore::new(db_path)
            .map_err(|e| ApiError::InternalError(format!("failed to open store: {}", e)))?;
        Ok(MomaService {
            adapter: GraphAdapter::new(store),
        })
    }

    /// Creates a service over a private in-memory database (for testing).
    pub fn in_memory() -> Result<Self, ApiError> {
        let store = SqliteStore::in_memory()
            .map_err(|e| ApiError::InternalError(format!("failed to open test store: {}", e)))?;
        Ok(MomaService {
            adapter: GraphAdapter::new(store),
        })
    }

    /// Writes a graph: nodes first, then edges.
    pub fn ingest(&mut self, graph: &PgGraph) -> Result<IngestStatus, ApiError> {
        let status = self.adapter.ingest(graph)?;
        debug!(
            nodes = status.nodes.written,
            edges = status.edges.written,
            skipped_edges = status.edges.skipped,
            "ingested graph"
        );
        Ok(status)
    }

    /// Returns a one-node graph, or an empty graph for an unknown id.
    pub fn retrieve(&self, id: &str) -> Result<PgGraph, ApiError> {
        Ok(self.adapter.read_node(id)?)
    }

    pub fn query(&self, filter: &FilterSpec) -> Result<QueryPage, ApiError> {
        Ok(query_datasets(&self.adapter, filter)?)
    }

    pub fn update_properties(&mut self, updates: &PgGraph) -> Result<OverlayStatus, ApiError> {
        Ok(self.adapter.apply_property_overlay(updates)?)
    }

    pub fn delete_datasets(&mut self, ids: &[String]) -> Result<DeleteStatus, ApiError> {
        Ok(self.adapter.cascade_delete(ids)?)
    }
}

/// Validates `graph`, failing only when the validator is strict and the
/// report is invalid. Non-strict findings are logged and returned.
pub fn check_schema(validator: &SchemaValidator, graph: &PgGraph) -> Result<ValidationReport, ApiError> {
    let report = validator.validate(graph);
    if !report.is_valid {
        return Err(ApiError::SchemaViolation(Box::new(report)));
    }
    if report.has_findings() {
        warn!(
            invalid = report.invalid_nodes.len(),
            unknown_labels = report.unknown_labels.len(),
            unlabeled = report.nodes_without_labels.len(),
            "accepting graph with schema findings"
        );
    }
    Ok(report)
}
