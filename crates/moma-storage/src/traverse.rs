//! Bounded neighborhood walks over the stored graph.
//!
//! Breadth-first from one root, following edges in both directions, for at
//! most `max_hops` hops. A node is entered only if the `pass` predicate
//! accepts it; the root is always entered. Used by query expansion (pass =
//! dependent label families) and by cascade delete (pass = anything except
//! another Dataset root).

use std::collections::{HashMap, HashSet, VecDeque};

use moma_core::{PgEdge, PgNode};

use crate::adapter::GraphAdapter;
use crate::error::StorageError;
use crate::traits::GraphStore;

/// Hop bound shared by query expansion and cascade delete.
pub const MAX_HOPS: usize = 4;

/// Result of a walk: every entered node except the root, and every edge
/// followed between two entered nodes.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    pub root: String,
    /// Entered nodes in discovery order, paired with their hop distance.
    pub nodes: Vec<(PgNode, usize)>,
    pub edges: Vec<PgEdge>,
}

impl Neighborhood {
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(n, _)| n.id.as_str())
    }
}

/// Walks outward from `root`. Returns `None` if the root does not exist.
pub fn walk<S, F>(
    adapter: &GraphAdapter<S>,
    root: &str,
    max_hops: usize,
    pass: F,
) -> Result<Option<Neighborhood>, StorageError>
where
    S: GraphStore,
    F: Fn(&PgNode) -> bool,
{
    if adapter.read_nodes(&[root.to_string()])?.is_empty() {
        return Ok(None);
    }

    let mut result = Neighborhood {
        root: root.to_string(),
        ..Neighborhood::default()
    };
    // Ids already judged by `pass`, mapped to the verdict.
    let mut judged: HashMap<String, bool> = HashMap::new();
    let mut seen_edges: HashSet<(String, String, Vec<String>)> = HashSet::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();

    judged.insert(root.to_string(), true);
    queue.push_back((root.to_string(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_hops {
            continue;
        }

        for edge in adapter.incident_edges(std::slice::from_ref(&current))? {
            let neighbor = if edge.from == current { &edge.to } else { &edge.from };

            let entered = match judged.get(neighbor) {
                Some(&verdict) => verdict,
                None => {
                    let verdict = match adapter.read_nodes(std::slice::from_ref(neighbor))?.pop() {
                        Some(node) if pass(&node) => {
                            queue.push_back((node.id.clone(), depth + 1));
                            result.nodes.push((node, depth + 1));
                            true
                        }
                        _ => false,
                    };
                    judged.insert(neighbor.clone(), verdict);
                    verdict
                }
            };

            if entered && seen_edges.insert(edge.key()) {
                result.edges.push(edge);
            }
        }
    }

    Ok(Some(result))
}
