//! PG-JSON property-graph model.
//!
//! [`PgGraph`] is the interchange form passed between the mapper, the
//! validator, the store adapter and API clients:
//!
//! ```json
//! {"nodes": [{"id": "...", "labels": [...], "properties": {...}}],
//!  "edges": [{"from": "...", "to": "...", "labels": [...], "properties": {...}}]}
//! ```
//!
//! Edge endpoints are always written as `from`/`to`; the legacy `start`/`end`
//! spelling is accepted on input only.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Node or edge properties. A `BTreeMap` keeps serialization deterministic.
pub type PropertyMap = BTreeMap<String, Value>;

/// A node in PG-JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgNode {
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

/// An edge in PG-JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgEdge {
    #[serde(alias = "start")]
    pub from: String,
    #[serde(alias = "end")]
    pub to: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl PgEdge {
    /// Creates a single-label edge without properties.
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        PgEdge {
            from: from.into(),
            to: to.into(),
            labels: vec![label.into()],
            properties: PropertyMap::new(),
        }
    }

    /// Identity used for edge deduplication: endpoints plus sorted labels.
    pub fn key(&self) -> (String, String, Vec<String>) {
        let mut labels = self.labels.clone();
        labels.sort();
        (self.from.clone(), self.to.clone(), labels)
    }
}

/// A property graph in PG-JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PgGraph {
    #[serde(default)]
    pub nodes: Vec<PgNode>,
    #[serde(default)]
    pub edges: Vec<PgEdge>,
}

impl PgGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Decodes a graph from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(CoreError::Graph)
    }

    /// Decodes a graph from JSON text.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(CoreError::Graph)
    }

    /// Finds a node by id.
    pub fn node(&self, id: &str) -> Option<&PgNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns edges carrying `label` that leave `from`.
    pub fn edges_from<'a>(&'a self, from: &'a str, label: &'a str) -> impl Iterator<Item = &'a PgEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from == from && e.labels.iter().any(|l| l == label))
    }

    /// Sorts nodes, edges and label lists so that two graphs with the same
    /// content compare equal regardless of emission order.
    pub fn canonicalize(&mut self) {
        for node in &mut self.nodes {
            node.labels.sort();
        }
        for edge in &mut self.edges {
            edge.labels.sort();
        }
        self.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        self.edges.sort_by(|a, b| {
            (&a.from, &a.to, &a.labels)
                .cmp(&(&b.from, &b.to, &b.labels))
                .then_with(|| {
                    let pa = serde_json::to_string(&a.properties).unwrap_or_default();
                    let pb = serde_json::to_string(&b.properties).unwrap_or_default();
                    pa.cmp(&pb)
                })
        });
    }

    /// Consumes the graph and returns its canonical form.
    pub fn into_canonical(mut self) -> Self {
        self.canonicalize();
        self
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Accumulates nodes and edges with store-like merge semantics: a repeated
/// node id overlays properties and unions labels, and a repeated
/// (from, to, labels) edge overlays properties. Emission order is kept.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: IndexMap<String, PgNode>,
    edges: IndexMap<(String, String, Vec<String>), PgEdge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, merging into an existing node with the same id.
    pub fn add_node(&mut self, node: PgNode) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => {
                for label in node.labels {
                    if !existing.labels.contains(&label) {
                        existing.labels.push(label);
                    }
                }
                existing.properties.extend(node.properties);
            }
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    /// Adds an edge, merging into an existing edge with the same key.
    pub fn add_edge(&mut self, edge: PgEdge) {
        let key = edge.key();
        match self.edges.get_mut(&key) {
            Some(existing) => existing.properties.extend(edge.properties),
            None => {
                self.edges.insert(key, edge);
            }
        }
    }

    pub fn build(self) -> PgGraph {
        PgGraph {
            nodes: self.nodes.into_values().collect(),
            edges: self.edges.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, labels: &[&str], props: Value) -> PgNode {
        PgNode {
            id: id.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: serde_json::from_value(props).unwrap(),
        }
    }

    #[test]
    fn edges_accept_legacy_endpoint_names() {
        let edge: PgEdge = serde_json::from_value(json!({
            "start": "a", "end": "b", "labels": ["field"]
        }))
        .unwrap();
        assert_eq!(edge.from, "a");
        assert_eq!(edge.to, "b");

        let out = serde_json::to_value(&edge).unwrap();
        assert_eq!(out["from"], "a");
        assert_eq!(out["to"], "b");
        assert!(out.get("start").is_none());
    }

    #[test]
    fn missing_labels_and_properties_default_to_empty() {
        let graph: PgGraph =
            serde_json::from_value(json!({"nodes": [{"id": "n1"}]})).unwrap();
        assert_eq!(graph.nodes[0].labels, Vec::<String>::new());
        assert!(graph.nodes[0].properties.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn builder_merges_repeated_nodes() {
        let mut builder = GraphBuilder::new();
        builder.add_node(node("n1", &["Column"], json!({"name": "a"})));
        builder.add_node(node("n1", &["Column", "Field"], json!({"dataType": "int"})));
        let graph = builder.build();

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].labels, vec!["Column", "Field"]);
        assert_eq!(graph.nodes[0].properties["name"], "a");
        assert_eq!(graph.nodes[0].properties["dataType"], "int");
    }

    #[test]
    fn builder_merges_repeated_edges() {
        let mut builder = GraphBuilder::new();
        builder.add_edge(PgEdge::new("ds", "rs", "recordSet"));
        builder.add_edge(PgEdge::new("ds", "rs", "recordSet"));
        builder.add_edge(PgEdge::new("rs", "ds", "recordSet"));
        assert_eq!(builder.build().edges.len(), 2);
    }

    #[test]
    fn canonical_form_ignores_emission_order() {
        let a = PgGraph {
            nodes: vec![node("b", &["Y", "X"], json!({})), node("a", &[], json!({}))],
            edges: vec![PgEdge::new("a", "b", "e2"), PgEdge::new("a", "b", "e1")],
        };
        let b = PgGraph {
            nodes: vec![node("a", &[], json!({})), node("b", &["X", "Y"], json!({}))],
            edges: vec![PgEdge::new("a", "b", "e1"), PgEdge::new("a", "b", "e2")],
        };
        assert_ne!(a, b);
        assert_eq!(a.into_canonical(), b.into_canonical());
    }

    #[test]
    fn edges_from_filters_by_label() {
        let graph = PgGraph {
            nodes: vec![],
            edges: vec![
                PgEdge::new("ds", "d1", "distribution"),
                PgEdge::new("ds", "rs", "recordSet"),
            ],
        };
        let targets: Vec<&str> = graph
            .edges_from("ds", "distribution")
            .map(|e| e.to.as_str())
            .collect();
        assert_eq!(targets, vec!["d1"]);
    }

    #[test]
    fn decoding_accepts_legacy_endpoints() {
        let graph = PgGraph::from_json(
            r#"{"nodes": [{"id": "a"}], "edges": [{"start": "a", "end": "b", "labels": ["l"]}]}"#,
        )
        .unwrap();
        assert_eq!(graph.edges[0].from, "a");
        assert_eq!(graph.edges[0].to, "b");
        assert!(graph.nodes[0].labels.is_empty());

        let err = PgGraph::from_value(json!({"nodes": [{"labels": []}]})).unwrap_err();
        assert!(matches!(err, CoreError::Graph(_)));
    }
}
