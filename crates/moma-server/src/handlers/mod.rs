//! HTTP handler modules for the MoMa API.
//!
//! Handlers parse requests, run conversion and validation, acquire the
//! service lock, delegate to [`MomaService`](crate::service::MomaService)
//! and return JSON responses.

pub mod health;
pub mod ingest;
pub mod lifecycle;
pub mod metadata;
