//! Metadata lookup and dataset queries.

use axum::extract::{Query, State};
use axum::Json;
use moma_query::{FilterSpec, QueryPage};

use crate::error::ApiError;
use crate::schema::metadata::{MetadataResponse, RetrieveParams};
use crate::state::AppState;

/// Returns one node by id.
///
/// `GET /retrieveMoMaMetadata?id=...`
pub async fn retrieve_metadata(
    State(state): State<AppState>,
    Query(params): Query<RetrieveParams>,
) -> Result<Json<MetadataResponse>, ApiError> {
    let service = state.service.lock().await;
    let metadata = service.retrieve(&params.id)?;
    Ok(Json(MetadataResponse { metadata }))
}

/// Runs a filtered, paged dataset query.
///
/// `POST /retrieveMoMaMetadata`
pub async fn query_metadata(
    State(state): State<AppState>,
    Json(filter): Json<FilterSpec>,
) -> Result<Json<QueryPage>, ApiError> {
    let service = state.service.lock().await;
    let page = service.query(&filter)?;
    Ok(Json(page))
}
