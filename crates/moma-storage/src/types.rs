//! Storage-layer types.
//!
//! [`StoredNode`] and [`StoredEdge`] are the store-side forms of PG-JSON
//! nodes and edges: labels and relationship types are sanitized
//! [`Identifier`]s and empty lists carry [`EMPTY_LIST_MARKER`]. Conversion
//! in both directions lives in [`crate::adapter`].

use moma_core::PropertyMap;
use serde::Serialize;

use crate::identifier::Identifier;

/// Stored in place of an empty list so that "known empty" and "absent"
/// stay distinguishable on read-back.
pub const EMPTY_LIST_MARKER: &str = "__moma_empty_list__";

/// A node as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub id: String,
    /// Labels in first-applied order, without duplicates.
    pub labels: Vec<Identifier>,
    pub properties: PropertyMap,
}

impl StoredNode {
    pub fn has_label(&self, label: &Identifier) -> bool {
        self.labels.contains(label)
    }
}

/// An edge as persisted. Identity is `(from, to, rel_type)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEdge {
    pub from: String,
    pub to: String,
    pub rel_type: Identifier,
    pub properties: PropertyMap,
}

impl StoredEdge {
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.from, &self.to, self.rel_type.as_str())
    }
}

/// A partial property update for one node. `null` values remove the key.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOverlay {
    pub id: String,
    pub properties: PropertyMap,
}

/// Outcome of a node or edge write pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStatus {
    /// Elements merged into the store.
    pub written: usize,
    /// Elements skipped (empty id, no label, or a missing endpoint).
    pub skipped: usize,
}

/// Outcome of a document or PG-JSON ingest: two separate write passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStatus {
    pub nodes: WriteStatus,
    pub edges: WriteStatus,
}

/// Outcome of a property overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatus {
    /// Nodes that matched an update id and were updated.
    pub updated_count: usize,
}

/// Outcome of a cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub deleted_count: usize,
    /// Dataset roots the cascade started from.
    pub roots: Vec<String>,
}

/// Merge step shared by both backends: later values win key by key.
pub(crate) fn merge_properties(target: &mut PropertyMap, incoming: &PropertyMap) {
    for (key, value) in incoming {
        target.insert(key.clone(), value.clone());
    }
}

/// Overlay step shared by both backends: `null` removes a key and `id` is
/// never written.
pub(crate) fn apply_overlay(target: &mut PropertyMap, overlay: &PropertyMap) {
    for (key, value) in overlay {
        if key == "id" {
            continue;
        }
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
