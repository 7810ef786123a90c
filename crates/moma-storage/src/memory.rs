//! In-memory implementation of [`GraphStore`].
//!
//! [`InMemoryStore`] keeps the graph in a petgraph `StableDiGraph` with an
//! id→index map, and has the same merge, skip and cascade semantics as the
//! SQLite backend. Used by tests and by the CLI's dry runs.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::StorageError;
use crate::identifier::Identifier;
use crate::traits::GraphStore;
use crate::types::{
    apply_overlay, merge_properties, PropertyOverlay, StoredEdge, StoredNode, WriteStatus,
};

/// Edge payload; endpoints live in the graph structure.
#[derive(Debug, Clone)]
struct EdgeData {
    rel_type: Identifier,
    properties: moma_core::PropertyMap,
}

/// petgraph-backed implementation of [`GraphStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    graph: StableDiGraph<StoredNode, EdgeData>,
    index: HashMap<String, NodeIndex>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn to_stored_edge(&self, source: NodeIndex, target: NodeIndex, data: &EdgeData) -> StoredEdge {
        StoredEdge {
            from: self.graph[source].id.clone(),
            to: self.graph[target].id.clone(),
            rel_type: data.rel_type.clone(),
            properties: data.properties.clone(),
        }
    }
}

impl GraphStore for InMemoryStore {
    fn merge_nodes(&mut self, nodes: &[StoredNode]) -> Result<WriteStatus, StorageError> {
        let mut status = WriteStatus::default();
        for node in nodes {
            match self.index.get(&node.id) {
                Some(&ix) => {
                    let existing = &mut self.graph[ix];
                    for label in &node.labels {
                        if !existing.labels.contains(label) {
                            existing.labels.push(label.clone());
                        }
                    }
                    merge_properties(&mut existing.properties, &node.properties);
                }
                None => {
                    let ix = self.graph.add_node(node.clone());
                    self.index.insert(node.id.clone(), ix);
                }
            }
            status.written += 1;
        }
        Ok(status)
    }

    fn merge_edges(&mut self, edges: &[StoredEdge]) -> Result<WriteStatus, StorageError> {
        let mut status = WriteStatus::default();
        for edge in edges {
            let (Some(&a), Some(&b)) = (self.index.get(&edge.from), self.index.get(&edge.to)) else {
                status.skipped += 1;
                continue;
            };
            let existing = self
                .graph
                .edges_connecting(a, b)
                .find(|e| e.weight().rel_type == edge.rel_type)
                .map(|e| e.id());
            match existing {
                Some(eid) => {
                    if let Some(data) = self.graph.edge_weight_mut(eid) {
                        merge_properties(&mut data.properties, &edge.properties);
                    }
                }
                None => {
                    self.graph.add_edge(
                        a,
                        b,
                        EdgeData {
                            rel_type: edge.rel_type.clone(),
                            properties: edge.properties.clone(),
                        },
                    );
                }
            }
            status.written += 1;
        }
        Ok(status)
    }

    fn overlay_properties(&mut self, updates: &[PropertyOverlay]) -> Result<usize, StorageError> {
        let mut matched = 0;
        for update in updates {
            if let Some(&ix) = self.index.get(&update.id) {
                apply_overlay(&mut self.graph[ix].properties, &update.properties);
                matched += 1;
            }
        }
        Ok(matched)
    }

    fn delete_nodes(&mut self, ids: &[String]) -> Result<usize, StorageError> {
        let mut deleted = 0;
        for id in ids {
            if let Some(ix) = self.index.remove(id) {
                self.graph.remove_node(ix);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn get_nodes(&self, ids: &[String]) -> Result<Vec<StoredNode>, StorageError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.index.get(id))
            .map(|&ix| self.graph[ix].clone())
            .collect())
    }

    fn find_nodes_by_label(&self, label: &Identifier) -> Result<Vec<StoredNode>, StorageError> {
        let mut nodes: Vec<StoredNode> = self
            .graph
            .node_weights()
            .filter(|n| n.has_label(label))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(nodes)
    }

    fn find_incident_edges(&self, ids: &[String]) -> Result<Vec<StoredEdge>, StorageError> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for id in ids {
            let Some(&ix) = self.index.get(id) else {
                continue;
            };
            for dir in [Direction::Outgoing, Direction::Incoming] {
                for e in self.graph.edges_directed(ix, dir) {
                    if seen.insert(e.id()) {
                        edges.push(self.to_stored_edge(e.source(), e.target(), e.weight()));
                    }
                }
            }
        }
        Ok(edges)
    }
}
