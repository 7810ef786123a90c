//! The store adapter: PG-JSON in, PG-JSON out.
//!
//! [`GraphAdapter`] wraps a [`GraphStore`] handle and owns the translation
//! between the external PG-JSON form and the stored form:
//!
//! - labels and relationship types are sanitized on write and restored on
//!   read, so vocabulary-qualified names survive the round trip;
//! - top-level empty-list properties become [`EMPTY_LIST_MARKER`] on write
//!   and `[]` again on read; property keys are stored verbatim;
//! - a multi-label edge is persisted as one relationship per label.
//!
//! Node upload and edge upload are separate store calls. [`GraphAdapter::ingest`]
//! runs them in that order, as two transactions.

use moma_core::{Label, PgEdge, PgGraph, PgNode, PropertyMap};
use serde_json::Value;

use crate::error::StorageError;
use crate::identifier::Identifier;
use crate::traits::GraphStore;
use crate::types::{IngestStatus, StoredEdge, StoredNode, WriteStatus, EMPTY_LIST_MARKER};

/// PG-JSON facade over a store handle.
pub struct GraphAdapter<S> {
    store: S,
}

impl<S: GraphStore> GraphAdapter<S> {
    pub fn new(store: S) -> Self {
        GraphAdapter { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // -------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------

    /// Merges every node of `graph` by id. Nodes with an empty id are
    /// skipped.
    pub fn upsert_nodes(&mut self, graph: &PgGraph) -> Result<WriteStatus, StorageError> {
        let mut stored = Vec::with_capacity(graph.nodes.len());
        let mut skipped = 0;
        for node in &graph.nodes {
            if node.id.is_empty() {
                skipped += 1;
                continue;
            }
            stored.push(to_stored_node(node)?);
        }
        let mut status = self.store.merge_nodes(&stored)?;
        status.skipped += skipped;
        tracing::debug!(written = status.written, skipped = status.skipped, "upserted nodes");
        Ok(status)
    }

    /// Merges every edge of `graph` by `(from, to, label)`.
    ///
    /// Endpoints must already be persisted, either by a preceding
    /// [`upsert_nodes`](Self::upsert_nodes) or by earlier ingests. Edges
    /// with a missing endpoint or no label are skipped and counted.
    pub fn upsert_edges(&mut self, graph: &PgGraph) -> Result<WriteStatus, StorageError> {
        let mut stored = Vec::new();
        let mut skipped = 0;
        for edge in &graph.edges {
            if edge.labels.is_empty() {
                skipped += 1;
                continue;
            }
            stored.extend(to_stored_edges(edge)?);
        }
        let mut status = self.store.merge_edges(&stored)?;
        if status.skipped > 0 {
            tracing::warn!(
                skipped = status.skipped,
                "skipped edges whose endpoints are not persisted"
            );
        }
        status.skipped += skipped;
        tracing::debug!(written = status.written, skipped = status.skipped, "upserted edges");
        Ok(status)
    }

    /// Node pass, then edge pass. The two passes are separate transactions:
    /// a failure in the second leaves the first committed, and re-running
    /// the ingest converges.
    pub fn ingest(&mut self, graph: &PgGraph) -> Result<IngestStatus, StorageError> {
        let nodes = self.upsert_nodes(graph)?;
        let edges = self.upsert_edges(graph)?;
        Ok(IngestStatus { nodes, edges })
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Fetches nodes by id in request order; unknown ids are skipped.
    pub fn read_nodes(&self, ids: &[String]) -> Result<Vec<PgNode>, StorageError> {
        self.store
            .get_nodes(ids)?
            .into_iter()
            .map(to_pg_node)
            .collect()
    }

    /// One-node graph for `id`, or an empty graph when the id is unknown.
    pub fn read_node(&self, id: &str) -> Result<PgGraph, StorageError> {
        Ok(PgGraph {
            nodes: self.read_nodes(&[id.to_string()])?,
            edges: Vec::new(),
        })
    }

    /// Edges touching any of `ids`, one PG-JSON edge per relationship.
    pub fn incident_edges(&self, ids: &[String]) -> Result<Vec<PgEdge>, StorageError> {
        self.store
            .find_incident_edges(ids)?
            .into_iter()
            .map(to_pg_edge)
            .collect()
    }

    /// All nodes carrying a registered label, ordered by id.
    pub fn nodes_with_label(&self, label: Label) -> Result<Vec<PgNode>, StorageError> {
        self.store
            .find_nodes_by_label(&Identifier::from(label))?
            .into_iter()
            .map(to_pg_node)
            .collect()
    }

    /// All Dataset roots, ordered by id.
    pub fn dataset_roots(&self) -> Result<Vec<PgNode>, StorageError> {
        self.nodes_with_label(Label::Dataset)
    }
}

// ---------------------------------------------------------------------------
// PG-JSON <-> stored form
// ---------------------------------------------------------------------------

fn to_stored_node(node: &PgNode) -> Result<StoredNode, StorageError> {
    let mut labels: Vec<Identifier> = Vec::with_capacity(node.labels.len());
    for label in &node.labels {
        let id = Identifier::new(label)?;
        if !labels.contains(&id) {
            labels.push(id);
        }
    }
    Ok(StoredNode {
        id: node.id.clone(),
        labels,
        properties: encode_properties(&node.properties),
    })
}

fn to_stored_edges(edge: &PgEdge) -> Result<Vec<StoredEdge>, StorageError> {
    let properties = encode_properties(&edge.properties);
    edge.labels
        .iter()
        .map(|label| {
            Ok(StoredEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
                rel_type: Identifier::new(label)?,
                properties: properties.clone(),
            })
        })
        .collect()
}

fn to_pg_node(node: StoredNode) -> Result<PgNode, StorageError> {
    let labels = node
        .labels
        .iter()
        .map(Identifier::token)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PgNode {
        id: node.id,
        labels,
        properties: decode_properties(node.properties),
    })
}

fn to_pg_edge(edge: StoredEdge) -> Result<PgEdge, StorageError> {
    Ok(PgEdge {
        labels: vec![edge.rel_type.token()?],
        from: edge.from,
        to: edge.to,
        properties: decode_properties(edge.properties),
    })
}

/// Drops nulls, then normalizes what remains.
fn encode_properties(properties: &PropertyMap) -> PropertyMap {
    let mut encoded = normalize_properties(properties);
    encoded.retain(|_, v| !v.is_null());
    encoded
}

/// Replaces empty lists with the marker. Keys are kept verbatim and nulls
/// are kept (overlay removals).
pub(crate) fn normalize_properties(properties: &PropertyMap) -> PropertyMap {
    properties
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Array(items) if items.is_empty() => Value::String(EMPTY_LIST_MARKER.to_string()),
                other => other.clone(),
            };
            (k.clone(), v)
        })
        .collect()
}

fn decode_properties(properties: PropertyMap) -> PropertyMap {
    properties
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) if s == EMPTY_LIST_MARKER => (k, Value::Array(Vec::new())),
            other => (k, other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use serde_json::json;

    fn graph(value: Value) -> PgGraph {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_qualified_labels_survive_round_trip() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        adapter
            .ingest(&graph(json!({
                "nodes": [
                    {"id": "d1", "labels": ["CSV", "cr:FileObject", "DataPart", "FileObject"]},
                    {"id": "f1", "labels": ["Column", "DataPart", "Field"]}
                ],
                "edges": [{"from": "f1", "to": "d1", "labels": ["source/fileObject"]}]
            })))
            .unwrap();

        let stored = &adapter.store().get_nodes(&["d1".to_string()]).unwrap()[0];
        assert_eq!(stored.labels[1].as_str(), "cr_u003A_FileObject");

        let back = adapter.read_node("d1").unwrap();
        assert_eq!(back.nodes[0].labels, vec!["CSV", "cr:FileObject", "DataPart", "FileObject"]);

        let edges = adapter.incident_edges(&["d1".to_string()]).unwrap();
        assert_eq!(edges[0].labels, vec!["source/fileObject"]);
    }

    #[test]
    fn test_empty_list_marker_round_trip() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        adapter
            .upsert_nodes(&graph(json!({
                "nodes": [{"id": "ds1", "labels": ["Dataset"],
                           "properties": {"keywords": [], "tags": ["a"], "gone": null}}]
            })))
            .unwrap();

        let stored = &adapter.store().get_nodes(&["ds1".to_string()]).unwrap()[0];
        assert_eq!(stored.properties["keywords"], EMPTY_LIST_MARKER);
        assert!(!stored.properties.contains_key("gone"));

        let node = &adapter.read_node("ds1").unwrap().nodes[0];
        assert_eq!(node.properties["keywords"], json!([]));
        assert_eq!(node.properties["tags"], json!(["a"]));
    }

    fn property_keys_round_trip<S: GraphStore>(store: S) {
        let mut adapter = GraphAdapter::new(store);
        let props = json!({"field of science": "a", "field_of_science": "b", " padded ": "c", "cr:dataType": "d"});
        adapter
            .upsert_nodes(&graph(json!({
                "nodes": [{"id": "ds1", "labels": ["Dataset"], "properties": props}]
            })))
            .unwrap();

        let node = &adapter.read_node("ds1").unwrap().nodes[0];
        assert_eq!(serde_json::to_value(&node.properties).unwrap(), props);
    }

    #[test]
    fn test_property_keys_round_trip_in_memory() {
        property_keys_round_trip(InMemoryStore::new());
    }

    #[test]
    fn test_property_keys_round_trip_sqlite() {
        property_keys_round_trip(crate::sqlite::SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn test_edges_before_nodes_are_skipped() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        let g = graph(json!({
            "nodes": [{"id": "ds1", "labels": ["Dataset"]}, {"id": "d1", "labels": ["CSV"]}],
            "edges": [{"from": "ds1", "to": "d1", "labels": ["distribution"]}]
        }));

        let early = adapter.upsert_edges(&g).unwrap();
        assert_eq!(early, WriteStatus { written: 0, skipped: 1 });

        let status = adapter.ingest(&g).unwrap();
        assert_eq!(status.nodes.written, 2);
        assert_eq!(status.edges, WriteStatus { written: 1, skipped: 0 });
    }

    #[test]
    fn test_multi_label_edge_fans_out() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        let status = adapter
            .ingest(&graph(json!({
                "nodes": [{"id": "a", "labels": ["Dataset"]}, {"id": "b", "labels": ["RecordSet"]}],
                "edges": [
                    {"from": "a", "to": "b", "labels": ["recordSet", "owns"]},
                    {"from": "a", "to": "b", "labels": []}
                ]
            })))
            .unwrap();
        assert_eq!(status.edges, WriteStatus { written: 2, skipped: 1 });
        assert_eq!(adapter.store().edge_count(), 2);
    }

    #[test]
    fn test_reingest_overlays_instead_of_duplicating() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        let first = graph(json!({"nodes": [{"id": "ds1", "labels": ["Dataset"], "properties": {"name": "a", "version": "1"}}]}));
        let second = graph(json!({"nodes": [{"id": "ds1", "labels": ["Dataset", "sc:Dataset"], "properties": {"name": "b"}}]}));
        adapter.ingest(&first).unwrap();
        adapter.ingest(&second).unwrap();

        let roots = adapter.dataset_roots().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].properties["name"], "b");
        assert_eq!(roots[0].properties["version"], "1");
        assert_eq!(roots[0].labels, vec!["Dataset", "sc:Dataset"]);
    }

    #[test]
    fn test_empty_id_and_missing_node() {
        let mut adapter = GraphAdapter::new(InMemoryStore::new());
        let status = adapter
            .upsert_nodes(&graph(json!({"nodes": [{"id": "", "labels": ["Dataset"]}]})))
            .unwrap();
        assert_eq!(status, WriteStatus { written: 0, skipped: 1 });
        assert!(adapter.read_node("nothing").unwrap().is_empty());
    }
}
