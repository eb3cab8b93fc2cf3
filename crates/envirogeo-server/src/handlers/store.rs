//! Document store protocol handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::AppState;
use envirogeo_core::{StoreRequest, StoreResponse};

/// POST /api/store - Run one store action
///
/// Every failure, including an unreadable body, is reported in the response
/// envelope with a 500 status.
pub async fn store_action(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let response = match serde_json::from_slice::<StoreRequest>(&body) {
        Ok(request) => request.handle(&state.store),
        Err(e) => {
            warn!(error = %e, "Rejected store request body");
            StoreResponse::failure(format!("Invalid request body: {}", e))
        }
    };
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response)).into_response()
}
