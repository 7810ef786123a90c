//! Pure document→graph conversion.
//!
//! [`convert`] turns a [`DatasetDocument`] into a PG-JSON [`PgGraph`]:
//!
//! 1. A Dataset root node built from a fixed allow-list of metadata keys.
//! 2. One node per distribution, classified through the shared
//!    [encoding table](crate::encoding), with a Dataset→distribution edge and
//!    a `containedIn` edge per declared parent container.
//! 3. One node per record set and per field, a Statistics node for fields
//!    with at least one non-null statistic, and the field→source,
//!    recordSet→field and Dataset→recordSet edges.
//!
//! The conversion is deterministic and never fails. Entities without an
//! identifier are skipped whole; unknown encodings fall back to a generic
//! kind. Both are reported as [`ConversionIssue`]s next to the graph.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::{DatasetDocument, DistributionEntry, FieldEntry, RecordSetEntry, StatisticsBlock};
use crate::encoding;
use crate::error::CoreError;
use crate::label::{Label, NodeKind, NodeLabels};
use crate::pg::{GraphBuilder, PgEdge, PgGraph, PgNode, PropertyMap};

/// Dataset-level metadata keys copied onto the root node.
pub const DATASET_METADATA_KEYS: &[&str] = &[
    "name",
    "archivedAt",
    "description",
    "conformsTo",
    "license",
    "url",
    "version",
    "headline",
    "keywords",
    "fieldOfScience",
    "inLanguage",
    "country",
    "datePublished",
    "status",
];

const DISTRIBUTION_KEYS: &[&str] = &["name", "description", "contentSize", "contentUrl"];
const RECORD_SET_KEYS: &[&str] = &["name", "description", "examples"];
const COLUMN_KEYS: &[&str] = &["name", "description", "dataType", "sample"];
const PDF_KEYS: &[&str] = &["name", "file_size_bytes", "keywords", "summary"];

/// Relationship types emitted by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// Dataset → distribution.
    Distribution,
    /// Contained distribution → parent container.
    ContainedIn,
    /// Dataset → record set.
    RecordSet,
    /// Record set → field.
    Field,
    /// Field → statistics.
    Statistics,
    /// Field → tabular source distribution.
    SourceFileObject,
    /// Field → document-set source distribution.
    SourceFileSet,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Distribution => "distribution",
            Relationship::ContainedIn => "containedIn",
            Relationship::RecordSet => "recordSet",
            Relationship::Field => "field",
            Relationship::Statistics => "statistics",
            Relationship::SourceFileObject => "source/fileObject",
            Relationship::SourceFileSet => "source/fileSet",
        }
    }
}

/// Entity types that can be skipped for lack of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Dataset,
    Distribution,
    RecordSet,
    Field,
    Statistics,
}

/// A non-fatal problem absorbed during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ConversionIssue {
    /// An entity had no identifier and was skipped with everything below it.
    #[serde(rename_all = "camelCase")]
    MissingIdentifier {
        entity: EntityKind,
        /// Identifier of the enclosing entity, when there is one.
        parent: Option<String>,
    },
    /// A distribution's encoding is not in the encoding table; it was given
    /// the fallback kind.
    #[serde(rename_all = "camelCase")]
    UnknownEncoding {
        distribution: String,
        encoding: Option<String>,
    },
}

/// Result of a conversion: the graph plus the issues absorbed on the way.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub graph: PgGraph,
    pub issues: Vec<ConversionIssue>,
}

/// Converts a document into its PG-JSON graph.
pub fn convert(document: &DatasetDocument) -> PgGraph {
    convert_with_issues(document).graph
}

/// Decodes a JSON document and converts it.
pub fn convert_value(value: Value) -> Result<Conversion, CoreError> {
    let document = DatasetDocument::from_value(value)?;
    Ok(convert_with_issues(&document))
}

/// Converts a document, also returning the issues absorbed on the way.
pub fn convert_with_issues(document: &DatasetDocument) -> Conversion {
    let mut mapper = Mapper::default();

    let Some(dataset_id) = non_empty(document.id.as_deref()) else {
        mapper.issues.push(ConversionIssue::MissingIdentifier {
            entity: EntityKind::Dataset,
            parent: None,
        });
        return mapper.finish();
    };

    mapper.map_dataset(dataset_id, document);
    for dist in &document.distribution {
        mapper.map_distribution(dataset_id, dist);
    }
    for record in &document.record_set {
        mapper.map_record_set(dataset_id, record);
    }
    mapper.finish()
}

#[derive(Default)]
struct Mapper {
    builder: GraphBuilder,
    issues: Vec<ConversionIssue>,
}

impl Mapper {
    fn finish(self) -> Conversion {
        Conversion {
            graph: self.builder.build(),
            issues: self.issues,
        }
    }

    fn missing(&mut self, entity: EntityKind, parent: &str) {
        self.issues.push(ConversionIssue::MissingIdentifier {
            entity,
            parent: Some(parent.to_string()),
        });
    }

    fn edge(&mut self, from: &str, to: &str, rel: Relationship) {
        self.builder.add_edge(PgEdge::new(from, to, rel.as_str()));
    }

    fn map_dataset(&mut self, dataset_id: &str, document: &DatasetDocument) {
        let mut properties = PropertyMap::new();
        insert_str(&mut properties, "type", document.kind.as_deref());
        copy_present(&mut properties, &document.metadata, DATASET_METADATA_KEYS);

        let labels = NodeLabels::new(NodeKind::Dataset).with_optional_tag(document.kind.as_deref());
        self.builder.add_node(PgNode {
            id: dataset_id.to_string(),
            labels: labels.to_labels(),
            properties,
        });
    }

    fn map_distribution(&mut self, dataset_id: &str, dist: &DistributionEntry) {
        let Some(dist_id) = non_empty(dist.id.as_deref()) else {
            self.missing(EntityKind::Distribution, dataset_id);
            return;
        };

        let parents = dist.parent_ids();
        let rule = dist.encoding_format.as_deref().and_then(encoding::lookup);
        let classification = match rule {
            Some(rule) => rule.classify(!parents.is_empty()),
            None => {
                self.issues.push(ConversionIssue::UnknownEncoding {
                    distribution: dist_id.to_string(),
                    encoding: dist.encoding_format.clone(),
                });
                encoding::fallback(dist.is_collection())
            }
        };

        let mut properties = PropertyMap::new();
        insert_str(&mut properties, "type", dist.kind.as_deref());
        insert_str(&mut properties, "encodingFormat", dist.encoding_format.as_deref());
        copy_present(&mut properties, &dist.attributes, DISTRIBUTION_KEYS);
        if let Some(rule) = rule {
            copy_present(&mut properties, &dist.attributes, rule.extra_properties);
        }

        let labels = NodeLabels::new(classification.kind)
            .with_tag(Label::Data.as_str())
            .with_tag(classification.structure.as_str())
            .with_optional_tag(dist.kind.as_deref());
        self.builder.add_node(PgNode {
            id: dist_id.to_string(),
            labels: labels.to_labels(),
            properties,
        });

        self.edge(dataset_id, dist_id, Relationship::Distribution);
        for parent in parents {
            self.edge(dist_id, parent, Relationship::ContainedIn);
        }
    }

    fn map_record_set(&mut self, dataset_id: &str, record: &RecordSetEntry) {
        let Some(record_id) = non_empty(record.id.as_deref()) else {
            self.missing(EntityKind::RecordSet, dataset_id);
            return;
        };

        let mut properties = PropertyMap::new();
        insert_str(&mut properties, "type", record.kind.as_deref());
        copy_present(&mut properties, &record.attributes, RECORD_SET_KEYS);

        let labels = NodeLabels::new(NodeKind::RecordSet).with_optional_tag(record.kind.as_deref());
        self.builder.add_node(PgNode {
            id: record_id.to_string(),
            labels: labels.to_labels(),
            properties,
        });
        self.edge(dataset_id, record_id, Relationship::RecordSet);

        for field in &record.field {
            self.map_field(record_id, field);
        }
    }

    fn map_field(&mut self, record_id: &str, field: &FieldEntry) {
        let Some(field_id) = non_empty(field.id.as_deref()) else {
            self.missing(EntityKind::Field, record_id);
            return;
        };

        let source = field.source.as_ref();
        let file_object = source
            .and_then(|s| s.file_object.as_ref())
            .and_then(|r| non_empty(r.id.as_deref()));

        let mut properties = PropertyMap::new();
        insert_str(&mut properties, "type", field.kind.as_deref());

        // A field sourced from a file object is a tabular column; anything
        // else is treated as document-derived.
        let (kind, source_edge) = match file_object {
            Some(object_id) => {
                copy_present(&mut properties, &field.attributes, COLUMN_KEYS);
                if let Some(column) = source
                    .and_then(|s| s.extract.as_ref())
                    .and_then(|e| e.column.as_ref())
                    .filter(|v| !v.is_null())
                {
                    properties.insert("column".to_string(), column.clone());
                }
                (NodeKind::Column, Some((object_id, Relationship::SourceFileObject)))
            }
            None => {
                copy_present(&mut properties, &field.attributes, PDF_KEYS);
                let file_set = source
                    .and_then(|s| s.file_set.as_ref())
                    .and_then(|r| non_empty(r.id.as_deref()));
                (NodeKind::Pdf, file_set.map(|id| (id, Relationship::SourceFileSet)))
            }
        };

        let labels = NodeLabels::new(kind).with_optional_tag(field.kind.as_deref());
        self.builder.add_node(PgNode {
            id: field_id.to_string(),
            labels: labels.to_labels(),
            properties,
        });

        if let Some(stats) = &field.statistics {
            self.map_statistics(field_id, stats);
        }
        if let Some((source_id, rel)) = source_edge {
            self.edge(field_id, source_id, rel);
        }
        self.edge(record_id, field_id, Relationship::Field);
    }

    fn map_statistics(&mut self, field_id: &str, stats: &StatisticsBlock) {
        let properties: PropertyMap = stats
            .values
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if properties.is_empty() {
            return;
        }

        let Some(stats_id) = non_empty(stats.id.as_deref()) else {
            self.missing(EntityKind::Statistics, field_id);
            return;
        };

        let labels = NodeLabels::new(NodeKind::Statistics).with_optional_tag(stats.kind.as_deref());
        self.builder.add_node(PgNode {
            id: stats_id.to_string(),
            labels: labels.to_labels(),
            properties,
        });
        self.edge(field_id, stats_id, Relationship::Statistics);
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.is_empty())
}

fn insert_str(properties: &mut PropertyMap, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        properties.insert(key.to_string(), Value::String(v.to_string()));
    }
}

/// Copies `keys` from `source`, dropping absent and null values.
fn copy_present(properties: &mut PropertyMap, source: &Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = source.get(*key).filter(|v| !v.is_null()) {
            properties.insert((*key).to_string(), value.clone());
        }
    }
}
