//! Paged dataset queries.
//!
//! A query runs in phases:
//!
//! 1. **Count**: Dataset roots passing the scalar predicates (and, with a
//!    type filter, owning a qualifying descendant) make up `total`.
//! 2. **Select**: matching roots are sorted and sliced by offset/count.
//! 3. **Expand**: each selected root's dependent neighborhood is walked.
//! 4. **Project**: root properties are trimmed to the allow-list and
//!    descendants outside the requested groupings are dropped, along with
//!    any edge that lost an endpoint.
//! 5. **Dedupe**: repeated nodes and edges are removed.

use std::collections::{HashMap, HashSet};

use moma_core::{LabelFamily, PgEdge, PgNode};
use moma_storage::{walk, GraphAdapter, GraphStore, Neighborhood, MAX_HOPS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dedup::{dedupe_edges, dedupe_nodes};
use crate::error::QueryError;
use crate::filter::{CompiledFilter, FilterSpec};

/// One page of query results in PG-JSON form, with paging echoes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    pub nodes: Vec<PgNode>,
    pub edges: Vec<PgEdge>,
    pub offset: usize,
    pub count: usize,
    /// Number of roots matching the filter, before paging.
    pub total: usize,
}

/// Runs a dataset query against the store.
pub fn query_datasets<S: GraphStore>(
    adapter: &GraphAdapter<S>,
    spec: &FilterSpec,
) -> Result<QueryPage, QueryError> {
    let filter = spec.compile()?;
    let mut walks: HashMap<String, Neighborhood> = HashMap::new();

    // Phase 1: count.
    let mut matching: Vec<PgNode> = Vec::new();
    for root in adapter.dataset_roots()? {
        if !filter.matches_root(&root) {
            continue;
        }
        if filter.has_type_filter() {
            let hood = expand(adapter, &root.id, &mut walks)?;
            if !has_qualifying_descendant(&filter, hood) {
                continue;
            }
        }
        matching.push(root);
    }
    let total = matching.len();

    // Phase 2: select.
    filter.sort_roots(&mut matching);
    let page: Vec<PgNode> = matching
        .into_iter()
        .skip(spec.offset)
        .take(spec.count)
        .collect();

    debug!(total, selected = page.len(), offset = spec.offset, "dataset query");

    let mut result = QueryPage {
        offset: spec.offset,
        count: spec.count,
        total,
        ..QueryPage::default()
    };
    if page.is_empty() {
        return Ok(result);
    }

    // Phases 3 and 4: expand and project.
    for root in page {
        let hood = expand(adapter, &root.id, &mut walks)?;
        if !has_qualifying_descendant(&filter, hood) {
            continue;
        }

        let mut included: HashSet<&str> = HashSet::new();
        included.insert(root.id.as_str());
        let mut descendants: Vec<PgNode> = Vec::new();
        for (node, _) in &hood.nodes {
            if filter.includes_descendant(node) {
                included.insert(node.id.as_str());
                descendants.push(node.clone());
            }
        }
        let edges: Vec<PgEdge> = hood
            .edges
            .iter()
            .filter(|e| included.contains(e.from.as_str()) && included.contains(e.to.as_str()))
            .cloned()
            .collect();

        result.nodes.push(filter.project_root(root.clone()));
        result.nodes.extend(descendants);
        result.edges.extend(edges);
    }

    // Phase 5: dedupe.
    result.nodes = dedupe_nodes(result.nodes);
    result.edges = dedupe_edges(result.edges);
    Ok(result)
}

/// Walks a root's dependent neighborhood once and caches it.
fn expand<'a, S: GraphStore>(
    adapter: &GraphAdapter<S>,
    root: &str,
    walks: &'a mut HashMap<String, Neighborhood>,
) -> Result<&'a Neighborhood, QueryError> {
    if !walks.contains_key(root) {
        let hood = walk(adapter, root, MAX_HOPS, |n| {
            LabelFamily::is_dependent(n.labels.as_slice())
        })?
        .unwrap_or_else(|| Neighborhood {
            root: root.to_string(),
            ..Neighborhood::default()
        });
        walks.insert(root.to_string(), hood);
    }
    Ok(&walks[root])
}

fn has_qualifying_descendant(filter: &CompiledFilter, hood: &Neighborhood) -> bool {
    !filter.has_type_filter() || hood.nodes.iter().any(|(n, _)| filter.qualifies(n))
}
