//! The [`GraphStore`] trait: the transport capability of the store layer.
//!
//! Backends see only sanitized identifiers and already-normalized property
//! maps. Every method is one logical store call; the SQLite backend runs
//! each write method in its own transaction.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, so the
//! adapter, traversal, lifecycle and query code run unchanged on either.

use crate::error::StorageError;
use crate::identifier::Identifier;
use crate::types::{PropertyOverlay, StoredEdge, StoredNode, WriteStatus};

/// The storage contract for label-typed property graphs.
pub trait GraphStore {
    // -------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------

    /// Merges nodes by id. New labels are added to the existing set and
    /// properties are overlaid key by key.
    fn merge_nodes(&mut self, nodes: &[StoredNode]) -> Result<WriteStatus, StorageError>;

    /// Merges edges by `(from, to, rel_type)`, overlaying properties.
    ///
    /// Edges whose endpoints are not both persisted are skipped and counted
    /// in [`WriteStatus::skipped`].
    fn merge_edges(&mut self, edges: &[StoredEdge]) -> Result<WriteStatus, StorageError>;

    /// Overlays properties onto existing nodes. `null` removes a key and
    /// the `id` key is ignored. Unknown ids are skipped.
    ///
    /// Returns the number of nodes matched.
    fn overlay_properties(&mut self, updates: &[PropertyOverlay]) -> Result<usize, StorageError>;

    /// Deletes nodes and all their incident edges. Unknown ids are skipped.
    ///
    /// Returns the number of nodes removed.
    fn delete_nodes(&mut self, ids: &[String]) -> Result<usize, StorageError>;

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Fetches nodes by id, in request order. Unknown ids are skipped.
    fn get_nodes(&self, ids: &[String]) -> Result<Vec<StoredNode>, StorageError>;

    /// All nodes carrying `label`, ordered by id.
    fn find_nodes_by_label(&self, label: &Identifier) -> Result<Vec<StoredNode>, StorageError>;

    /// Edges with either endpoint in `ids`, without duplicates.
    fn find_incident_edges(&self, ids: &[String]) -> Result<Vec<StoredEdge>, StorageError>;
}
