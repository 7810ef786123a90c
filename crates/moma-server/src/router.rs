//! Router assembly for the MoMa HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// CORS is permissive. TraceLayer provides request-level logging via
/// tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        // Ingest
        .route("/ingestProfile2MoMa", post(handlers::ingest::ingest_profile))
        .route("/ingestPgJson", post(handlers::ingest::ingest_pg_json))
        .route("/validatePgJson", post(handlers::ingest::validate_pg_json))
        // Reads
        .route(
            "/retrieveMoMaMetadata",
            get(handlers::metadata::retrieve_metadata).post(handlers::metadata::query_metadata),
        )
        // Lifecycle
        .route(
            "/updateMoMaProperties",
            post(handlers::lifecycle::update_properties),
        )
        .route(
            "/deleteMoMaDatasets",
            post(handlers::lifecycle::delete_datasets),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
