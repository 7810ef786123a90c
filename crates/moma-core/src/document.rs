//! Dataset-description document model.
//!
//! Documents are JSON-LD-like metadata records describing one dataset, its
//! physical distributions and its logical record sets. Only the keys the
//! mapper reads are typed; everything else is kept in the `attributes` maps.
//! `@id`/`@type` are the primary key spellings, `id`/`type` are accepted as
//! aliases. Every key is optional: entities missing their identifier are
//! skipped by the mapper rather than rejected here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// A reference to another entity by identifier (`{"@id": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
}

/// One reference or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum References {
    One(Reference),
    Many(Vec<Reference>),
}

impl References {
    /// Non-empty identifiers, in document order.
    pub fn ids(&self) -> Vec<&str> {
        let refs: &[Reference] = match self {
            References::One(r) => std::slice::from_ref(r),
            References::Many(rs) => rs,
        };
        refs.iter()
            .filter_map(|r| r.id.as_deref())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// Root of a dataset-description document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(rename = "@type", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub distribution: Vec<DistributionEntry>,
    #[serde(rename = "recordSet", default)]
    pub record_set: Vec<RecordSetEntry>,
    /// Remaining dataset-level metadata (name, license, datePublished, ...).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl DatasetDocument {
    /// Decodes a document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(CoreError::Document)
    }

    /// Decodes a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(CoreError::Document)
    }
}

/// A physical artifact: file, file set or database connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionEntry {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(rename = "@type", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "encodingFormat", default)]
    pub encoding_format: Option<String>,
    #[serde(rename = "containedIn", default)]
    pub contained_in: Option<References>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DistributionEntry {
    /// Identifiers of the parent containers this distribution declares.
    pub fn parent_ids(&self) -> Vec<&str> {
        self.contained_in
            .as_ref()
            .map(|refs| refs.ids())
            .unwrap_or_default()
    }

    /// Returns `true` if the entry describes a collection of files.
    pub fn is_collection(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.ends_with("FileSet"))
            || self.attributes.contains_key("includes")
    }
}

/// A logical grouping of fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSetEntry {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(rename = "@type", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub field: Vec<FieldEntry>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// One field of a record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldEntry {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(rename = "@type", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub source: Option<FieldSource>,
    #[serde(default)]
    pub statistics: Option<StatisticsBlock>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Where a field's values come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSource {
    #[serde(rename = "fileObject", default)]
    pub file_object: Option<Reference>,
    #[serde(rename = "fileSet", default)]
    pub file_set: Option<Reference>,
    #[serde(default)]
    pub extract: Option<Extract>,
}

/// Extraction hint inside a field source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extract {
    #[serde(default)]
    pub column: Option<Value>,
}

/// Per-field statistics. All keys other than `@id`/`@type` are statistic
/// values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsBlock {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(rename = "@type", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_both_identifier_spellings() {
        let a = DatasetDocument::from_value(json!({"@id": "ds1", "@type": "sc:Dataset"})).unwrap();
        let b = DatasetDocument::from_value(json!({"id": "ds1", "type": "sc:Dataset"})).unwrap();
        assert_eq!(a.id.as_deref(), Some("ds1"));
        assert_eq!(b.id, a.id);
        assert_eq!(b.kind, a.kind);
    }

    #[test]
    fn unknown_keys_land_in_metadata() {
        let doc = DatasetDocument::from_value(json!({
            "@id": "ds1",
            "name": "Census",
            "license": "CC-BY"
        }))
        .unwrap();
        assert_eq!(doc.metadata["name"], "Census");
        assert!(!doc.metadata.contains_key("@id"));
        assert!(doc.distribution.is_empty());
    }

    #[test]
    fn contained_in_accepts_one_or_many() {
        let one: DistributionEntry =
            serde_json::from_value(json!({"@id": "t1", "containedIn": {"@id": "db1"}})).unwrap();
        assert_eq!(one.parent_ids(), vec!["db1"]);

        let many: DistributionEntry = serde_json::from_value(json!({
            "@id": "t1",
            "containedIn": [{"@id": "db1"}, {"@id": ""}, {"@id": "db2"}]
        }))
        .unwrap();
        assert_eq!(many.parent_ids(), vec!["db1", "db2"]);

        let none: DistributionEntry = serde_json::from_value(json!({"@id": "t1"})).unwrap();
        assert!(none.parent_ids().is_empty());
    }

    #[test]
    fn collection_detection() {
        let set: DistributionEntry =
            serde_json::from_value(json!({"@id": "s", "@type": "cr:FileSet"})).unwrap();
        assert!(set.is_collection());

        let includes: DistributionEntry =
            serde_json::from_value(json!({"@id": "s", "includes": "*.png"})).unwrap();
        assert!(includes.is_collection());

        let object: DistributionEntry =
            serde_json::from_value(json!({"@id": "o", "@type": "cr:FileObject"})).unwrap();
        assert!(!object.is_collection());
    }

    #[test]
    fn statistics_values_exclude_identity_keys() {
        let stats: StatisticsBlock =
            serde_json::from_value(json!({"@id": "s1", "@type": "Stats", "mean": 5, "max": null}))
                .unwrap();
        assert_eq!(stats.id.as_deref(), Some("s1"));
        assert_eq!(stats.values.len(), 2);
        assert!(!stats.values.contains_key("@type"));
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = DatasetDocument::from_json("{\"distribution\": 5}").unwrap_err();
        assert!(matches!(err, CoreError::Document(_)));
    }
}
