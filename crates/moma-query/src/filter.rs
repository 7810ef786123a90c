//! Filter specs and their compiled form.
//!
//! A [`FilterSpec`] arrives from a client as JSON. [`FilterSpec::compile`]
//! checks it against the label registry and the encoding table and yields a
//! [`CompiledFilter`] holding the root predicates, the qualifying
//! descendant labels and the projection rules.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use moma_core::encoding;
use moma_core::{Label, LabelFamily, PgNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// Page size used when a filter omits `count`.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// Client-facing dataset filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Dataset root ids; empty means unrestricted.
    #[serde(alias = "ids")]
    pub node_ids: Vec<String>,
    /// Root property keys and grouping names (`distribution`,
    /// `recordSet`) to return; empty means everything.
    pub properties: Vec<String>,
    /// Labels at least one descendant must carry.
    pub types: Vec<String>,
    /// MIME types, translated to labels through the encoding table.
    pub mime_types: Vec<String>,
    /// Root property keys to sort by; `id` sorts by node id.
    pub order_by: Vec<String>,
    pub direction: SortDirection,
    /// Inclusive lower bound on `datePublished` (`YYYY-MM-DD`).
    pub published_from: Option<String>,
    /// Inclusive upper bound on `datePublished` (`YYYY-MM-DD`).
    pub published_to: Option<String>,
    /// Accepted lifecycle `status` values; empty means unrestricted.
    pub status: Vec<String>,
    pub offset: usize,
    pub count: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            node_ids: Vec::new(),
            properties: Vec::new(),
            types: Vec::new(),
            mime_types: Vec::new(),
            order_by: Vec::new(),
            direction: SortDirection::Asc,
            published_from: None,
            published_to: None,
            status: Vec::new(),
            offset: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterSpec {
    /// Validates the filter and resolves labels, MIME types and dates.
    pub fn compile(&self) -> Result<CompiledFilter, QueryError> {
        let mut type_labels: Vec<Label> = Vec::new();
        for token in &self.types {
            let label = Label::parse(token)
                .or_else(|| Label::parse_qualified(token))
                .ok_or_else(|| QueryError::InvalidFilter(format!("unknown type label {token:?}")))?;
            push_unique(&mut type_labels, label);
        }
        for mime in &self.mime_types {
            let labels = encoding::labels_for_mime(mime)
                .ok_or_else(|| QueryError::InvalidFilter(format!("unknown MIME type {mime:?}")))?;
            for label in labels {
                push_unique(&mut type_labels, label);
            }
        }

        let published_from = self.published_from.as_deref().map(parse_date).transpose()?;
        let published_to = self.published_to.as_deref().map(parse_date).transpose()?;
        if let (Some(from), Some(to)) = (published_from, published_to) {
            if from > to {
                return Err(QueryError::InvalidFilter(format!(
                    "publication range is empty: {from} > {to}"
                )));
            }
        }

        let groupings: HashSet<LabelFamily> = self
            .properties
            .iter()
            .filter_map(|p| LabelFamily::from_grouping(p))
            .collect();

        Ok(CompiledFilter {
            ids: self.node_ids.iter().cloned().collect(),
            type_labels,
            published_from,
            published_to,
            status: self.status.clone(),
            properties: self.properties.clone(),
            groupings,
            order_by: self.order_by.clone(),
            direction: self.direction,
        })
    }
}

fn push_unique(labels: &mut Vec<Label>, label: Label) {
    if !labels.contains(&label) {
        labels.push(label);
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| QueryError::InvalidFilter(format!("bad date {text:?}: {e}")))
}

/// Reads a stored `datePublished` value. Accepts a bare date or a
/// timestamp whose first ten characters are a date.
fn stored_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// A validated filter.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    ids: HashSet<String>,
    type_labels: Vec<Label>,
    published_from: Option<NaiveDate>,
    published_to: Option<NaiveDate>,
    status: Vec<String>,
    properties: Vec<String>,
    groupings: HashSet<LabelFamily>,
    order_by: Vec<String>,
    direction: SortDirection,
}

impl CompiledFilter {
    /// Returns `true` if a type filter is in effect.
    pub fn has_type_filter(&self) -> bool {
        !self.type_labels.is_empty()
    }

    pub fn type_labels(&self) -> &[Label] {
        &self.type_labels
    }

    /// Scalar predicates on a Dataset root: id, publication date, status.
    pub fn matches_root(&self, root: &PgNode) -> bool {
        if !self.ids.is_empty() && !self.ids.contains(&root.id) {
            return false;
        }
        if self.published_from.is_some() || self.published_to.is_some() {
            let Some(date) = root.properties.get("datePublished").and_then(stored_date) else {
                return false;
            };
            if self.published_from.is_some_and(|from| date < from)
                || self.published_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }
        if !self.status.is_empty() {
            let status = root.properties.get("status").and_then(Value::as_str);
            if !status.is_some_and(|s| self.status.iter().any(|want| want == s)) {
                return false;
            }
        }
        true
    }

    /// Returns `true` if a descendant carries one of the requested type
    /// labels. Always `true` without a type filter.
    pub fn qualifies(&self, node: &PgNode) -> bool {
        !self.has_type_filter()
            || self
                .type_labels
                .iter()
                .any(|t| node.labels.iter().any(|l| l == t.as_str()))
    }

    /// Returns `true` if a descendant should be part of the response.
    pub fn includes_descendant(&self, node: &PgNode) -> bool {
        if self.properties.is_empty() {
            return true;
        }
        LabelFamily::of(node.labels.as_slice()).is_some_and(|f| self.groupings.contains(&f))
    }

    /// Trims a root node's properties to the allow-list.
    pub fn project_root(&self, mut root: PgNode) -> PgNode {
        if !self.properties.is_empty() {
            root.properties.retain(|k, _| self.properties.iter().any(|p| p == k));
        }
        root
    }

    /// Sorts roots by the requested keys, breaking ties by id. Missing
    /// values (including unknown keys) sort after present ones.
    pub fn sort_roots(&self, roots: &mut [PgNode]) {
        roots.sort_by(|a, b| {
            let mut ord = Ordering::Equal;
            for key in &self.order_by {
                ord = if key == "id" {
                    a.id.cmp(&b.id)
                } else {
                    compare_optional(a.properties.get(key), b.properties.get(key))
                };
                if ord != Ordering::Equal {
                    break;
                }
            }
            if self.direction == SortDirection::Desc {
                ord = ord.reverse();
            }
            ord.then_with(|| a.id.cmp(&b.id))
        });
    }
}

fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}
