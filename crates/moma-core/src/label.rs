//! Label registry for graph nodes.
//!
//! A node's label set is modelled as one canonical [`NodeKind`] discriminator
//! plus an open set of additional tags (see [`NodeLabels`]). The kind decides
//! the minimal label subset a node must carry; tags add structural labels such
//! as `Data` and descriptive vocabulary types such as `cr:FileObject`.
//!
//! [`Label`] is the closed allow-list of legal label tokens. Every token that
//! reaches a store query is either a [`Label`] or a vocabulary-qualified form
//! of one, which keeps identifier construction whitelist-checked.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Vocabulary prefixes accepted in front of a canonical label token.
pub const VOCABULARY_PREFIXES: &[&str] = &["sc", "cr", "schema"];

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// The allow-list of legal label tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Dataset,
    Data,
    DataPart,
    FileSet,
    FileObject,
    DatabaseConnection,
    RelationalDatabase,
    TextSet,
    ImageSet,
    #[serde(rename = "CSV")]
    Csv,
    Table,
    Field,
    Column,
    #[serde(rename = "PDF")]
    Pdf,
    RecordSet,
    Statistics,
    User,
    Task,
    #[serde(rename = "Analytical_Pattern")]
    AnalyticalPattern,
    Operator,
}

impl Label {
    /// Every registered label, in declaration order.
    pub const ALL: [Label; 20] = [
        Label::Dataset,
        Label::Data,
        Label::DataPart,
        Label::FileSet,
        Label::FileObject,
        Label::DatabaseConnection,
        Label::RelationalDatabase,
        Label::TextSet,
        Label::ImageSet,
        Label::Csv,
        Label::Table,
        Label::Field,
        Label::Column,
        Label::Pdf,
        Label::RecordSet,
        Label::Statistics,
        Label::User,
        Label::Task,
        Label::AnalyticalPattern,
        Label::Operator,
    ];

    /// The token as it appears in PG-JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Dataset => "Dataset",
            Label::Data => "Data",
            Label::DataPart => "DataPart",
            Label::FileSet => "FileSet",
            Label::FileObject => "FileObject",
            Label::DatabaseConnection => "DatabaseConnection",
            Label::RelationalDatabase => "RelationalDatabase",
            Label::TextSet => "TextSet",
            Label::ImageSet => "ImageSet",
            Label::Csv => "CSV",
            Label::Table => "Table",
            Label::Field => "Field",
            Label::Column => "Column",
            Label::Pdf => "PDF",
            Label::RecordSet => "RecordSet",
            Label::Statistics => "Statistics",
            Label::User => "User",
            Label::Task => "Task",
            Label::AnalyticalPattern => "Analytical_Pattern",
            Label::Operator => "Operator",
        }
    }

    /// Parses a canonical (unprefixed) token.
    pub fn parse(token: &str) -> Option<Label> {
        Label::ALL.iter().copied().find(|l| l.as_str() == token)
    }

    /// Parses a vocabulary-qualified token such as `cr:FileObject`.
    ///
    /// Returns `None` for unprefixed tokens and for unknown prefixes.
    pub fn parse_qualified(token: &str) -> Option<Label> {
        let (prefix, local) = token.split_once(':')?;
        if !VOCABULARY_PREFIXES.contains(&prefix) {
            return None;
        }
        Label::parse(local)
    }

    /// Returns `true` if `token` is on the allow-list, canonical or qualified.
    pub fn is_allowed(token: &str) -> bool {
        Label::parse(token).is_some() || Label::parse_qualified(token).is_some()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Canonical kind discriminator of a node.
///
/// Each kind owns a minimal label subset; a node whose labels are a superset
/// of that subset is a valid node of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Dataset,
    /// Generic file collection (fallback for collection distributions).
    Data,
    /// Generic single file (fallback for single-object distributions).
    DataPart,
    RelationalDatabase,
    Table,
    Csv,
    Column,
    Pdf,
    TextSet,
    ImageSet,
    RecordSet,
    Statistics,
    User,
    Task,
    AnalyticalPattern,
    Operator,
}

impl NodeKind {
    /// Every registered kind.
    pub const ALL: [NodeKind; 16] = [
        NodeKind::Dataset,
        NodeKind::Data,
        NodeKind::DataPart,
        NodeKind::RelationalDatabase,
        NodeKind::Table,
        NodeKind::Csv,
        NodeKind::Column,
        NodeKind::Pdf,
        NodeKind::TextSet,
        NodeKind::ImageSet,
        NodeKind::RecordSet,
        NodeKind::Statistics,
        NodeKind::User,
        NodeKind::Task,
        NodeKind::AnalyticalPattern,
        NodeKind::Operator,
    ];

    /// The minimal label subset for this kind. The first entry is the
    /// kind's primary label.
    pub fn required_labels(&self) -> &'static [Label] {
        match self {
            NodeKind::Dataset => &[Label::Dataset],
            NodeKind::Data => &[Label::Data, Label::FileSet],
            NodeKind::DataPart => &[Label::DataPart, Label::FileObject],
            NodeKind::RelationalDatabase => &[
                Label::RelationalDatabase,
                Label::DatabaseConnection,
                Label::Data,
            ],
            NodeKind::Table => &[Label::Table, Label::DataPart, Label::FileObject],
            NodeKind::Csv => &[Label::Csv, Label::DataPart, Label::FileObject],
            NodeKind::Column => &[Label::Column, Label::DataPart, Label::Field],
            NodeKind::Pdf => &[Label::Pdf, Label::DataPart, Label::Field],
            NodeKind::TextSet => &[Label::TextSet, Label::Data, Label::FileSet],
            NodeKind::ImageSet => &[Label::ImageSet, Label::Data, Label::FileSet],
            NodeKind::RecordSet => &[Label::RecordSet],
            NodeKind::Statistics => &[Label::Statistics],
            NodeKind::User => &[Label::User],
            NodeKind::Task => &[Label::Task],
            NodeKind::AnalyticalPattern => &[Label::AnalyticalPattern],
            NodeKind::Operator => &[Label::Operator],
        }
    }

    /// The kind's primary label.
    pub fn primary_label(&self) -> Label {
        self.required_labels()[0]
    }

    /// Returns `true` if `labels` is a superset of this kind's minimal subset.
    pub fn is_satisfied_by<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        self.required_labels()
            .iter()
            .all(|required| labels.iter().any(|l| l.as_ref() == required.as_str()))
    }

    /// Classifies a label set, preferring the most specific matching kind.
    ///
    /// Returns `None` when no registered minimal subset is contained in
    /// `labels`.
    pub fn classify<S: AsRef<str>>(labels: &[S]) -> Option<NodeKind> {
        NodeKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_satisfied_by(labels))
            .max_by_key(|kind| kind.required_labels().len())
    }
}

// ---------------------------------------------------------------------------
// Label families
// ---------------------------------------------------------------------------

/// Label families of dependent entities hanging off a dataset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelFamily {
    /// Physical artifacts: files, file sets, database connections.
    Distribution,
    /// Logical schema: record sets, fields and their statistics.
    RecordSet,
}

impl LabelFamily {
    /// Labels that place a node in this family.
    pub fn labels(&self) -> &'static [Label] {
        match self {
            LabelFamily::Distribution => &[
                Label::FileObject,
                Label::FileSet,
                Label::DatabaseConnection,
                Label::Csv,
                Label::Table,
                Label::TextSet,
                Label::ImageSet,
                Label::RelationalDatabase,
            ],
            LabelFamily::RecordSet => &[
                Label::RecordSet,
                Label::Field,
                Label::Column,
                Label::Pdf,
                Label::Statistics,
            ],
        }
    }

    /// The grouping name used by query property lists (`distribution`,
    /// `recordSet`).
    pub fn grouping(&self) -> &'static str {
        match self {
            LabelFamily::Distribution => "distribution",
            LabelFamily::RecordSet => "recordSet",
        }
    }

    /// Resolves a grouping name.
    pub fn from_grouping(name: &str) -> Option<LabelFamily> {
        match name {
            "distribution" => Some(LabelFamily::Distribution),
            "recordSet" => Some(LabelFamily::RecordSet),
            _ => None,
        }
    }

    /// Determines the family of a label set. Record-schema labels win over
    /// distribution labels, since fields carry the shared `DataPart` tag.
    pub fn of<S: AsRef<str>>(labels: &[S]) -> Option<LabelFamily> {
        [LabelFamily::RecordSet, LabelFamily::Distribution]
            .into_iter()
            .find(|family| {
                labels.iter().any(|l| {
                    family
                        .labels()
                        .iter()
                        .any(|member| member.as_str() == l.as_ref())
                })
            })
    }

    /// Returns `true` if the label set belongs to any dependent family.
    pub fn is_dependent<S: AsRef<str>>(labels: &[S]) -> bool {
        LabelFamily::of(labels).is_some()
    }
}

// ---------------------------------------------------------------------------
// NodeLabels
// ---------------------------------------------------------------------------

/// A node's labels: one kind discriminator plus additional tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabels {
    pub kind: NodeKind,
    pub tags: IndexSet<String>,
}

impl NodeLabels {
    pub fn new(kind: NodeKind) -> Self {
        NodeLabels {
            kind,
            tags: IndexSet::new(),
        }
    }

    /// Adds a tag; empty tags are ignored.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !tag.is_empty() {
            self.tags.insert(tag);
        }
        self
    }

    /// Adds an optional descriptive tag such as a document `@type`.
    pub fn with_optional_tag(self, tag: Option<&str>) -> Self {
        match tag {
            Some(t) => self.with_tag(t),
            None => self,
        }
    }

    /// Renders the PG-JSON label list: primary label, tags in insertion
    /// order, then the rest of the kind's minimal subset. No duplicates.
    pub fn to_labels(&self) -> Vec<String> {
        let mut out: IndexSet<String> = IndexSet::new();
        out.insert(self.kind.primary_label().as_str().to_string());
        for tag in &self.tags {
            out.insert(tag.clone());
        }
        for label in self.kind.required_labels() {
            out.insert(label.as_str().to_string());
        }
        out.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_tokens_roundtrip_through_parse() {
        for label in Label::ALL {
            assert_eq!(Label::parse(label.as_str()), Some(label));
        }
        assert_eq!(Label::parse("Distribution"), None);
    }

    #[test]
    fn qualified_labels_need_a_known_prefix() {
        assert_eq!(Label::parse_qualified("cr:FileObject"), Some(Label::FileObject));
        assert_eq!(Label::parse_qualified("sc:Dataset"), Some(Label::Dataset));
        assert_eq!(Label::parse_qualified("xx:Dataset"), None);
        assert_eq!(Label::parse_qualified("Dataset"), None);
        assert!(Label::is_allowed("CSV"));
        assert!(Label::is_allowed("cr:Field"));
        assert!(!Label::is_allowed("cr:Bogus"));
    }

    #[test]
    fn serde_uses_pg_json_tokens() {
        let json = serde_json::to_string(&Label::AnalyticalPattern).unwrap();
        assert_eq!(json, "\"Analytical_Pattern\"");
        let back: Label = serde_json::from_str("\"CSV\"").unwrap();
        assert_eq!(back, Label::Csv);
    }

    #[test]
    fn classify_prefers_most_specific_kind() {
        let labels = ["CSV", "Data", "FileObject", "DataPart"];
        assert_eq!(NodeKind::classify(&labels), Some(NodeKind::Csv));

        let labels = ["DataPart", "FileObject"];
        assert_eq!(NodeKind::classify(&labels), Some(NodeKind::DataPart));

        let labels = ["CSV", "FileObject"];
        assert_eq!(NodeKind::classify(&labels), None);
    }

    #[test]
    fn to_labels_puts_primary_then_tags_then_rest() {
        let labels = NodeLabels::new(NodeKind::Csv)
            .with_tag("Data")
            .with_tag("FileObject")
            .with_optional_tag(Some("cr:FileObject"))
            .to_labels();
        assert_eq!(
            labels,
            vec!["CSV", "Data", "FileObject", "cr:FileObject", "DataPart"]
        );
        assert!(NodeKind::Csv.is_satisfied_by(labels.as_slice()));
    }

    #[test]
    fn empty_tags_are_ignored() {
        let labels = NodeLabels::new(NodeKind::RecordSet)
            .with_tag("")
            .with_optional_tag(None)
            .to_labels();
        assert_eq!(labels, vec!["RecordSet"]);
    }

    #[test]
    fn fields_belong_to_record_family() {
        let column = ["Column", "DataPart", "Field"];
        assert_eq!(LabelFamily::of(&column), Some(LabelFamily::RecordSet));

        let csv = ["CSV", "DataPart", "FileObject"];
        assert_eq!(LabelFamily::of(&csv), Some(LabelFamily::Distribution));

        let dataset = ["Dataset"];
        assert_eq!(LabelFamily::of(&dataset), None);
        assert!(!LabelFamily::is_dependent(&["User"]));
    }

    #[test]
    fn grouping_names_resolve() {
        for family in [LabelFamily::Distribution, LabelFamily::RecordSet] {
            assert_eq!(LabelFamily::from_grouping(family.grouping()), Some(family));
        }
        assert_eq!(LabelFamily::from_grouping("name"), None);
    }
}
