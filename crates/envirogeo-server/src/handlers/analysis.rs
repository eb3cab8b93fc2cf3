//! Analysis handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};

use crate::{parse_body, AppError, AppState};
use envirogeo_core::{models::AnalysisResult, AnalysisRequest};

/// POST /api/analyze - Validate a request and run the analysis
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, AppError> {
    let request: AnalysisRequest = parse_body(&body)?;
    let result = state.analyzer.analyze(&request).await?;
    Ok(Json(result))
}
