//! NDVI summary handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use envirogeo_core::NationalSummary;

/// GET /api/ndvi/national - Country-wide yearly NDVI averages
pub async fn national_ndvi(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NationalSummary>, AppError> {
    let summary = state.analyzer.national_summary().await?;
    Ok(Json(summary))
}
