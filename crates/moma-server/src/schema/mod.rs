//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response bodies for one group of
//! endpoints. Graph payloads reuse the PG-JSON types from `moma-core`.

pub mod ingest;
pub mod lifecycle;
pub mod metadata;
