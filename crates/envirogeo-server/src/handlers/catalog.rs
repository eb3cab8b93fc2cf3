//! Health and static catalog handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use envirogeo_core::{
    models::SampleLocation,
    parameters::{self, SAMPLE_LOCATIONS},
    DocumentStore, NdviSource, ParameterDefinition,
};

/// Response for the health endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: String,
    /// Configured NDVI source, if any
    pub ndvi_source: Option<String>,
}

/// GET /api/health - Liveness and backend summary
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.store.name().to_string(),
        ndvi_source: state
            .analyzer
            .ndvi_source()
            .map(|source| source.name().to_string()),
    })
}

/// GET /api/parameters - The parameter catalog in display order
pub async fn list_parameters() -> Json<&'static [ParameterDefinition]> {
    Json(parameters::all())
}

/// GET /api/locations - Sample map locations
pub async fn list_locations() -> Json<Vec<SampleLocation>> {
    Json(SAMPLE_LOCATIONS.to_vec())
}
