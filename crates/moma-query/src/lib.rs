//! Filtered, paged queries over stored dataset metadata.
//!
//! # Modules
//!
//! - [`filter`]: client filter specs and their compiled form
//! - [`engine`]: the count/select/expand/project/dedupe pipeline
//! - [`dedup`]: node and edge deduplication
//! - [`error`]: QueryError

pub mod dedup;
pub mod engine;
pub mod error;
pub mod filter;

// Re-export key types for ergonomic use.
pub use engine::{query_datasets, QueryPage};
pub use error::QueryError;
pub use filter::{CompiledFilter, FilterSpec, SortDirection, DEFAULT_PAGE_SIZE};
