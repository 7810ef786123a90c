//! Metadata lookup types.

use moma_core::PgGraph;
use serde::{Deserialize, Serialize};

/// Query string of `GET /retrieveMoMaMetadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveParams {
    pub id: String,
}

/// Response of `GET /retrieveMoMaMetadata`: a one-node graph, or an empty
/// graph when the id is unknown.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataResponse {
    pub metadata: PgGraph,
}
