//! Store adapter for MoMa property graphs.
//!
//! Provides the [`GraphStore`] trait (the transport capability), the
//! [`InMemoryStore`] and [`SqliteStore`] backends, and the [`GraphAdapter`]
//! that speaks PG-JSON on top of either backend.
//!
//! # Architecture
//!
//! - **Backends** implement a small set of store calls over sanitized
//!   identifiers: merge nodes, merge edges, overlay properties, delete
//!   nodes, and three reads.
//! - **The adapter** handles identifier sanitization, empty-list markers,
//!   per-label edge fan-out and write ordering, plus the lifecycle
//!   operations built on those calls.
//!
//! # Modules
//!
//! - [`error`]: StorageError
//! - [`identifier`]: reversible sanitization and the [`Identifier`] newtype
//! - [`types`]: stored forms and operation status values
//! - [`traits`]: GraphStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation
//! - [`adapter`]: GraphAdapter (PG-JSON upsert and read)
//! - [`traverse`]: bounded neighborhood walks
//! - [`lifecycle`]: property overlay and cascading delete

pub mod adapter;
pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod traverse;
pub mod types;

// Re-export key types for ergonomic use.
pub use adapter::GraphAdapter;
pub use error::StorageError;
pub use identifier::{sanitize, unsanitize, Identifier};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::GraphStore;
pub use traverse::{walk, Neighborhood, MAX_HOPS};
pub use types::{DeleteStatus, IngestStatus, OverlayStatus, WriteStatus, EMPTY_LIST_MARKER};
