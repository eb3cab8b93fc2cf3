//! Per-user profile and analysis history handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{parse_body, AppError, AppState, SuccessResponse};
use envirogeo_core::{
    models::{AnalysisResult, ProfileUpdate},
    store::{to_document, ANALYSIS_HISTORY, PROFILES},
    Document, DocumentStore, Error, UpsertResult,
};

/// Response for a newly saved analysis
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    pub inserted_id: String,
}

/// GET /api/users/:user_id/profile - Fetch a user's profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let profile = state
        .store
        .get_profile(PROFILES, &user_id)?
        .ok_or_else(|| Error::NotFound(format!("profile for user {}", user_id)))?;
    Ok(Json(profile))
}

/// PUT /api/users/:user_id/profile - Create or update a user's profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<UpsertResult>, AppError> {
    let update: ProfileUpdate = parse_body(&body)?;
    let result = state
        .store
        .upsert_profile(PROFILES, &user_id, &to_document(&update)?)?;
    Ok(Json(result))
}

/// GET /api/users/:user_id/history - Saved analyses, newest first
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let history = state.store.get_analysis_history(ANALYSIS_HISTORY, &user_id)?;
    Ok(Json(history))
}

/// POST /api/users/:user_id/history - Save an analysis result
pub async fn save_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<SavedResponse>, AppError> {
    let result: AnalysisResult = parse_body(&body)?;
    let data = to_document(&result.to_new_analysis())?;
    let id = state.store.save_analysis(ANALYSIS_HISTORY, &user_id, data)?;

    info!(user = %user_id, id = %id, parameter = %result.parameter.id, "Saved analysis");
    Ok(Json(SavedResponse { inserted_id: id }))
}

/// DELETE /api/users/:user_id/history/:id - Delete one of the user's analyses
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, AppError> {
    let deleted = state
        .store
        .delete_analysis(ANALYSIS_HISTORY, &user_id, &id)?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("analysis {}", id)).into());
    }

    info!(user = %user_id, id = %id, "Deleted analysis");
    Ok(Json(SuccessResponse { success: true }))
}
