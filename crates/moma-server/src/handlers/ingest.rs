//! Document and PG-JSON ingest, plus standalone validation.

use axum::extract::State;
use axum::Json;
use moma_core::{convert_value, PgGraph};
use serde_json::Value;

use crate::error::ApiError;
use crate::schema::ingest::{IngestResponse, ValidateResponse};
use crate::service::check_schema;
use crate::state::AppState;

/// Converts a dataset document to PG-JSON, validates it and stores it.
///
/// `POST /ingestProfile2MoMa`
pub async fn ingest_profile(
    State(state): State<AppState>,
    Json(document): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    let conversion = convert_value(document)?;
    if conversion.graph.is_empty() {
        return Err(ApiError::BadRequest(
            "document has no dataset identifier".to_string(),
        ));
    }
    let validation = check_schema(&state.validator, &conversion.graph)?;

    let mut service = state.service.lock().await;
    let written = service.ingest(&conversion.graph)?;

    Ok(Json(IngestResponse {
        status: "success",
        written,
        issues: conversion.issues,
        validation,
    }))
}

/// Validates and stores a PG-JSON graph as-is.
///
/// `POST /ingestPgJson`
pub async fn ingest_pg_json(
    State(state): State<AppState>,
    Json(graph): Json<PgGraph>,
) -> Result<Json<IngestResponse>, ApiError> {
    let validation = check_schema(&state.validator, &graph)?;

    let mut service = state.service.lock().await;
    let written = service.ingest(&graph)?;

    Ok(Json(IngestResponse {
        status: "success",
        written,
        issues: Vec::new(),
        validation,
    }))
}

/// Returns the validation report for a graph without storing it.
///
/// `POST /validatePgJson`
pub async fn validate_pg_json(
    State(state): State<AppState>,
    Json(graph): Json<PgGraph>,
) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        validation: state.validator.validate(&graph),
    })
}
