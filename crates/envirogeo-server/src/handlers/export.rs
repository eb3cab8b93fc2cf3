//! Export handlers

use axum::{
    body::{Body, Bytes},
    extract::Query,
    http::{header, Response, StatusCode},
};
use serde::Deserialize;
use tracing::info;

use crate::{parse_body, AppError};
use envirogeo_core::{export, models::AnalysisResult, ExportFormat};

/// Query parameters for result export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output format (default: csv)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// POST /api/export - Render a result as a downloadable file
pub async fn export_result(
    Query(params): Query<ExportQuery>,
    body: Bytes,
) -> Result<Response<Body>, AppError> {
    let format: ExportFormat = params.format.parse()?;
    let result: AnalysisResult = parse_body(&body)?;
    let file = export::export(&result, format)?;

    info!(
        format = format.as_str(),
        file = %file.file_name,
        points = result.time_series.len(),
        "Exported analysis"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        )
        .body(Body::from(file.content))
        .map_err(|e| AppError::internal(&e.to_string()))
}
