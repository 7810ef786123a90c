//! The encoding→kind table.
//!
//! One data-driven table maps a distribution's content-encoding value to its
//! node kind and structural label. The Graph Mapper classifies distributions
//! with it and the Query Engine translates MIME-type filters through it, so
//! the two call sites cannot drift apart.

use crate::label::{Label, NodeKind};

/// Version of [`ENCODING_TABLE`]. Bump on any change to its rows.
pub const ENCODING_TABLE_VERSION: u32 = 1;

/// Kind plus structural label assigned to a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: NodeKind,
    /// `FileObject`, `FileSet` or `DatabaseConnection`.
    pub structure: Label,
}

impl Classification {
    const fn new(kind: NodeKind, structure: Label) -> Self {
        Classification { kind, structure }
    }
}

/// One row of the encoding table.
#[derive(Debug, Clone, Copy)]
pub struct EncodingRule {
    /// Lower-case content-encoding value.
    pub encoding: &'static str,
    /// Classification when the distribution has no parent container.
    pub standalone: Classification,
    /// Classification when the distribution declares `containedIn`. `None`
    /// means the parent reference does not change the kind.
    pub contained: Option<Classification>,
    /// Document keys copied onto the node in addition to the base set.
    pub extra_properties: &'static [&'static str],
}

impl EncodingRule {
    /// Picks the classification for a distribution with or without a parent.
    pub fn classify(&self, has_parent: bool) -> Classification {
        match (has_parent, self.contained) {
            (true, Some(contained)) => contained,
            _ => self.standalone,
        }
    }

    /// Every kind this row can produce.
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        std::iter::once(self.standalone.kind).chain(self.contained.map(|c| c.kind))
    }
}

const TEXT_SET: Classification = Classification::new(NodeKind::TextSet, Label::FileSet);
const IMAGE_SET: Classification = Classification::new(NodeKind::ImageSet, Label::FileSet);
const FILE_SET_INCLUDES: &[&str] = &["includes"];

/// The canonical encoding→kind table.
pub const ENCODING_TABLE: &[EncodingRule] = &[
    EncodingRule {
        encoding: "text/csv",
        standalone: Classification::new(NodeKind::Csv, Label::FileObject),
        contained: None,
        extra_properties: &["sha256"],
    },
    EncodingRule {
        encoding: "text/sql",
        standalone: Classification::new(NodeKind::RelationalDatabase, Label::DatabaseConnection),
        contained: Some(Classification::new(NodeKind::Table, Label::FileObject)),
        extra_properties: &[],
    },
    EncodingRule {
        encoding: "application/pdf",
        standalone: TEXT_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
    EncodingRule {
        encoding: "application/docx",
        standalone: TEXT_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
    EncodingRule {
        encoding: "application/pptx",
        standalone: TEXT_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
    EncodingRule {
        encoding: "application/x-ipynb+json",
        standalone: TEXT_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
    EncodingRule {
        encoding: "image/jpg",
        standalone: IMAGE_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
    EncodingRule {
        encoding: "image/jpeg",
        standalone: IMAGE_SET,
        contained: None,
        extra_properties: FILE_SET_INCLUDES,
    },
];

/// Looks up a row by encoding, ignoring ASCII case and surrounding space.
pub fn lookup(encoding: &str) -> Option<&'static EncodingRule> {
    let needle = encoding.trim();
    ENCODING_TABLE
        .iter()
        .find(|rule| rule.encoding.eq_ignore_ascii_case(needle))
}

/// Fallback for encodings missing from the table: a generic collection or a
/// generic single object.
pub fn fallback(is_collection: bool) -> Classification {
    if is_collection {
        Classification::new(NodeKind::Data, Label::FileSet)
    } else {
        Classification::new(NodeKind::DataPart, Label::FileObject)
    }
}

/// Translates a MIME type into the primary labels of every kind it can
/// classify to. Returns `None` if the MIME type is not in the table.
pub fn labels_for_mime(mime: &str) -> Option<Vec<Label>> {
    let rule = lookup(mime)?;
    let mut labels: Vec<Label> = rule.kinds().map(|k| k.primary_label()).collect();
    labels.dedup();
    Some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodings_are_unique_and_lower_case() {
        for (i, rule) in ENCODING_TABLE.iter().enumerate() {
            assert_eq!(rule.encoding, rule.encoding.to_ascii_lowercase());
            for other in &ENCODING_TABLE[i + 1..] {
                assert_ne!(rule.encoding, other.encoding);
            }
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let rule = lookup(" Text/CSV ").unwrap();
        assert_eq!(rule.standalone.kind, NodeKind::Csv);
        assert!(lookup("application/zip").is_none());
    }

    #[test]
    fn sql_depends_on_parent() {
        let rule = lookup("text/sql").unwrap();
        assert_eq!(rule.classify(false).kind, NodeKind::RelationalDatabase);
        assert_eq!(rule.classify(false).structure, Label::DatabaseConnection);
        assert_eq!(rule.classify(true).kind, NodeKind::Table);
        assert_eq!(rule.classify(true).structure, Label::FileObject);
    }

    #[test]
    fn parent_is_ignored_where_not_relevant() {
        let rule = lookup("text/csv").unwrap();
        assert_eq!(rule.classify(true), rule.classify(false));
    }

    #[test]
    fn every_row_classifies_to_a_satisfiable_kind() {
        // The structural label must belong to the kind's minimal subset, or
        // mapper output would fail strict validation.
        for rule in ENCODING_TABLE {
            for has_parent in [false, true] {
                let c = rule.classify(has_parent);
                assert!(
                    c.kind.required_labels().contains(&c.structure),
                    "{} -> {:?}",
                    rule.encoding,
                    c
                );
            }
        }
    }

    #[test]
    fn mime_translation_covers_both_sql_kinds() {
        assert_eq!(
            labels_for_mime("text/sql"),
            Some(vec![Label::RelationalDatabase, Label::Table])
        );
        assert_eq!(labels_for_mime("application/pdf"), Some(vec![Label::TextSet]));
        assert_eq!(labels_for_mime("video/mp4"), None);
    }

    #[test]
    fn fallback_matches_collection_shape() {
        assert_eq!(fallback(true).kind, NodeKind::Data);
        assert_eq!(fallback(false).kind, NodeKind::DataPart);
    }
}
