//! HTTP/JSON API server for MoMa dataset metadata.
//!
//! Exposes document ingest, PG-JSON ingest and validation, single-node
//! lookup, filtered dataset queries, property updates and cascading
//! deletes over a SQLite-backed store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
