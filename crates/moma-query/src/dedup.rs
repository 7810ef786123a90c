//! Result deduplication.
//!
//! Expansions of different roots can reach the same descendant, and a
//! store may return the same relationship once per endpoint. Nodes are
//! unique by id; edges by endpoints, sorted labels and a content hash of
//! their properties. First occurrence wins, so output order is stable.

use std::collections::HashSet;

use moma_core::{PgEdge, PgNode};

type EdgeFingerprint = (String, String, Vec<String>, [u8; 32]);

/// Removes repeated node ids, keeping the first occurrence.
pub fn dedupe_nodes(nodes: Vec<PgNode>) -> Vec<PgNode> {
    let mut seen: HashSet<String> = HashSet::with_capacity(nodes.len());
    nodes
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect()
}

/// Removes repeated edges, keeping the first occurrence.
pub fn dedupe_edges(edges: Vec<PgEdge>) -> Vec<PgEdge> {
    let mut seen: HashSet<EdgeFingerprint> = HashSet::with_capacity(edges.len());
    edges
        .into_iter()
        .filter(|e| seen.insert(fingerprint(e)))
        .collect()
}

fn fingerprint(edge: &PgEdge) -> EdgeFingerprint {
    let (from, to, labels) = edge.key();
    // PropertyMap is ordered, so equal maps serialize to equal bytes.
    let bytes = serde_json::to_vec(&edge.properties).unwrap_or_default();
    (from, to, labels, *blake3::hash(&bytes).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nodes_keep_first_occurrence() {
        let a1 = PgNode {
            id: "a".to_string(),
            labels: vec!["Dataset".to_string()],
            properties: Default::default(),
        };
        let mut a2 = a1.clone();
        a2.labels.push("sc:Dataset".to_string());
        let b = PgNode {
            id: "b".to_string(),
            ..a1.clone()
        };

        let out = dedupe_nodes(vec![a1.clone(), b.clone(), a2]);
        assert_eq!(out, vec![a1, b]);
    }

    #[test]
    fn edges_differ_by_labels_and_properties() {
        let plain = PgEdge::new("a", "b", "field");
        let mut weighted = plain.clone();
        weighted.properties.insert("weight".to_string(), json!(1));
        let mut relabeled = PgEdge::new("a", "b", "source/fileObject");
        relabeled.labels.push("field".to_string());
        let mut reordered = PgEdge::new("a", "b", "field");
        reordered.labels.insert(0, "source/fileObject".to_string());

        let out = dedupe_edges(vec![
            plain.clone(),
            weighted.clone(),
            plain.clone(),
            relabeled.clone(),
            reordered,
        ]);
        assert_eq!(out, vec![plain, weighted, relabeled]);
    }
}
