//! Document→graph mapping and schema validation for MoMa dataset metadata.
//!
//! # Modules
//!
//! - [`pg`]: PG-JSON nodes, edges and graphs, plus [`pg::GraphBuilder`]
//! - [`label`]: label allow-list, node kinds and label families
//! - [`encoding`]: the shared encoding→kind table
//! - [`document`]: dataset-description document model
//! - [`mapper`]: pure document→graph conversion
//! - [`schema`]: label/kind validation of PG-JSON graphs
//! - [`error`]: CoreError

pub mod document;
pub mod encoding;
pub mod error;
pub mod label;
pub mod mapper;
pub mod pg;
pub mod schema;

// Re-export commonly used types
pub use document::DatasetDocument;
pub use error::CoreError;
pub use label::{Label, LabelFamily, NodeKind, NodeLabels};
pub use mapper::{convert, convert_value, convert_with_issues, Conversion, ConversionIssue, Relationship};
pub use pg::{GraphBuilder, PgEdge, PgGraph, PgNode, PropertyMap};
pub use schema::{NodeFinding, SchemaValidator, ValidationReport};
