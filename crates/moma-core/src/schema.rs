//! Label/kind validation of PG-JSON graphs.
//!
//! A node passes when it has at least one label, every label is on the
//! allow-list, and its labels contain the minimal subset of at least one
//! registered [`NodeKind`]. Strict mode lets any finding fail the report;
//! lenient mode records the same findings and fails only on unlabeled
//! nodes.

use serde::Serialize;

use crate::label::{Label, NodeKind};
use crate::pg::{PgGraph, PgNode};

/// A node that failed one of the checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFinding {
    pub id: String,
    pub labels: Vec<String>,
}

impl NodeFinding {
    fn of(node: &PgNode) -> Self {
        NodeFinding {
            id: node.id.clone(),
            labels: node.labels.clone(),
        }
    }
}

/// Structured validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total_nodes: usize,
    /// Nodes whose labels match no registered minimal subset.
    pub invalid_nodes: Vec<NodeFinding>,
    /// Nodes carrying at least one label outside the allow-list.
    pub unknown_labels: Vec<NodeFinding>,
    /// Ids of nodes with an empty label set.
    pub nodes_without_labels: Vec<String>,
    pub is_valid: bool,
    pub strict: bool,
}

impl ValidationReport {
    /// Returns `true` if any check recorded a finding, regardless of mode.
    pub fn has_findings(&self) -> bool {
        !self.invalid_nodes.is_empty()
            || !self.unknown_labels.is_empty()
            || !self.nodes_without_labels.is_empty()
    }
}

/// Validates PG-JSON graphs against the label registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaValidator {
    strict: bool,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::strict()
    }
}

impl SchemaValidator {
    pub fn new(strict: bool) -> Self {
        SchemaValidator { strict }
    }

    pub fn strict() -> Self {
        Self::new(true)
    }

    pub fn lenient() -> Self {
        Self::new(false)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn validate(&self, graph: &PgGraph) -> ValidationReport {
        let mut report = ValidationReport {
            total_nodes: graph.nodes.len(),
            invalid_nodes: Vec::new(),
            unknown_labels: Vec::new(),
            nodes_without_labels: Vec::new(),
            is_valid: true,
            strict: self.strict,
        };

        for node in &graph.nodes {
            if node.labels.is_empty() {
                report.nodes_without_labels.push(node.id.clone());
                continue;
            }
            if node.labels.iter().any(|l| !Label::is_allowed(l)) {
                report.unknown_labels.push(NodeFinding::of(node));
            }
            if NodeKind::classify(node.labels.as_slice()).is_none() {
                report.invalid_nodes.push(NodeFinding::of(node));
            }
        }

        // An unlabeled node is invalid in either mode.
        report.is_valid = report.nodes_without_labels.is_empty()
            && !(self.strict && report.has_findings());
        report
    }
}
