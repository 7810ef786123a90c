//! End-to-end store tests: mapper output through the adapter into both
//! backends, then cascade delete.

use moma_core::{convert, DatasetDocument, NodeKind, PgGraph};
use moma_storage::{GraphAdapter, GraphStore, InMemoryStore, SqliteStore};
use serde_json::json;

fn census_document() -> DatasetDocument {
    DatasetDocument::from_value(json!({
        "@id": "ds1",
        "@type": "sc:Dataset",
        "name": "Census",
        "keywords": [],
        "distribution": [
            {"@id": "db1", "@type": "cr:FileObject", "encodingFormat": "text/sql"},
            {"@id": "t1", "@type": "cr:FileObject", "encodingFormat": "text/sql", "containedIn": {"@id": "db1"}}
        ],
        "recordSet": [{
            "@id": "rs1",
            "@type": "cr:RecordSet",
            "field": [{
                "@id": "f1",
                "@type": "cr:Field",
                "source": {"fileObject": {"@id": "t1"}, "extract": {"column": "age"}},
                "statistics": {"@id": "s1", "mean": 41.5}
            }]
        }]
    }))
    .unwrap()
}

fn unrelated() -> PgGraph {
    // An operator linked to ds1's table: reachable, but not dependent-kind.
    serde_json::from_value(json!({
        "nodes": [
            {"id": "op1", "labels": ["Operator"], "properties": {"name": "join"}},
            {"id": "ds2", "labels": ["Dataset"]},
            {"id": "d2", "labels": ["CSV", "Data", "DataPart", "FileObject"]}
        ],
        "edges": [
            {"from": "op1", "to": "t1", "labels": ["reads"]},
            {"from": "op1", "to": "ds2", "labels": ["reads"]},
            {"from": "ds2", "to": "d2", "labels": ["distribution"]}
        ]
    }))
    .unwrap()
}

fn scenario_d<S: GraphStore>(store: S) {
    let mut adapter = GraphAdapter::new(store);
    let graph = convert(&census_document());
    let status = adapter.ingest(&graph).unwrap();
    assert_eq!(status.nodes.written, 6);
    assert_eq!(status.edges.skipped, 0);
    adapter.ingest(&unrelated()).unwrap();

    let root = adapter.read_node("ds1").unwrap();
    assert_eq!(root.nodes[0].properties["keywords"], json!([]));
    assert_eq!(root.nodes[0].labels, vec!["Dataset", "sc:Dataset"]);

    let table = &adapter.read_node("t1").unwrap().nodes[0];
    assert_eq!(NodeKind::classify(table.labels.as_slice()), Some(NodeKind::Table));

    let deleted = adapter.cascade_delete(&["ds1".to_string()]).unwrap();
    assert_eq!(deleted.deleted_count, 6);

    for gone in ["ds1", "db1", "t1", "rs1", "f1", "s1"] {
        assert!(adapter.read_node(gone).unwrap().is_empty(), "{gone} survived");
    }
    for kept in ["op1", "ds2", "d2"] {
        assert!(!adapter.read_node(kept).unwrap().is_empty(), "{kept} was deleted");
    }
    assert_eq!(adapter.incident_edges(&["op1".to_string()]).unwrap().len(), 1);
}

#[test]
fn test_scenario_d_in_memory() {
    scenario_d(InMemoryStore::new());
}

#[test]
fn test_scenario_d_sqlite() {
    scenario_d(SqliteStore::in_memory().unwrap());
}

#[test]
fn test_sqlite_file_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moma.db");
    let path = path.to_str().unwrap();

    {
        let mut adapter = GraphAdapter::new(SqliteStore::new(path).unwrap());
        adapter.ingest(&convert(&census_document())).unwrap();
    }

    let adapter = GraphAdapter::new(SqliteStore::new(path).unwrap());
    let roots = adapter.dataset_roots().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].properties["name"], "Census");

    let edges = adapter.incident_edges(&["f1".to_string()]).unwrap();
    let mut labels: Vec<&str> = edges.iter().map(|e| e.labels[0].as_str()).collect();
    labels.sort();
    assert_eq!(labels, vec!["field", "source/fileObject", "statistics"]);
}

#[test]
fn test_reingest_is_idempotent() {
    let mut adapter = GraphAdapter::new(SqliteStore::in_memory().unwrap());
    let graph = convert(&census_document());
    adapter.ingest(&graph).unwrap();
    let before = adapter.incident_edges(&["ds1".to_string(), "t1".to_string()]).unwrap();
    adapter.ingest(&graph).unwrap();
    let after = adapter.incident_edges(&["ds1".to_string(), "t1".to_string()]).unwrap();
    assert_eq!(before, after);
    assert_eq!(adapter.dataset_roots().unwrap().len(), 1);
}
