//! Property update and delete types.

use serde::{Deserialize, Serialize};

/// Response of `POST /updateMoMaProperties`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub status: &'static str,
    /// Nodes matched and updated; unknown ids are not counted.
    pub updated: usize,
}

/// Body of `POST /deleteMoMaDatasets`. An empty id list deletes every
/// dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

/// Response of `POST /deleteMoMaDatasets`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub status: &'static str,
    pub deleted_count: usize,
    /// Dataset roots that were removed.
    pub roots: Vec<String>,
}
