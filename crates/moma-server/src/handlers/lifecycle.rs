//! Property updates and cascading dataset deletes.

use axum::extract::State;
use axum::Json;
use moma_core::PgGraph;

use crate::error::ApiError;
use crate::schema::lifecycle::{DeleteRequest, DeleteResponse, UpdateResponse};
use crate::state::AppState;

/// Merges the properties of each node in the body into the stored node
/// with the same id. Edges in the body are ignored.
///
/// `POST /updateMoMaProperties`
pub async fn update_properties(
    State(state): State<AppState>,
    Json(updates): Json<PgGraph>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let status = service.update_properties(&updates)?;
    Ok(Json(UpdateResponse {
        status: "success",
        updated: status.updated_count,
    }))
}

/// Deletes datasets and their dependent entities.
///
/// `POST /deleteMoMaDatasets`
pub async fn delete_datasets(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let status = service.delete_datasets(&request.ids)?;
    Ok(Json(DeleteResponse {
        status: "success",
        deleted_count: status.deleted_count,
        roots: status.roots,
    }))
}
