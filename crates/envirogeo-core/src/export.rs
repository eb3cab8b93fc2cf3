//! Export of analysis results
//!
//! Supports:
//! - CSV of the time series (`Date,Value`)
//! - GeoJSON FeatureCollection carrying the series and statistics
//!
//! Shapefile is recognised but rejected; it would need server-side tooling.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::{AnalysisResult, Geometry, ParameterId, TimeSeriesPoint};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    GeoJson,
    Shapefile,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Shapefile => "shapefile",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Shapefile => "shp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::GeoJson => "application/geo+json",
            ExportFormat::Shapefile => "application/octet-stream",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "geojson" | "json" => Ok(ExportFormat::GeoJson),
            "shapefile" | "shp" => Ok(ExportFormat::Shapefile),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rendered export ready to download or write
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Download name: `{parameter}_{yyyyMMdd}_{yyyyMMdd}.{ext}`
pub fn file_name(
    parameter: ParameterId,
    start: NaiveDate,
    end: NaiveDate,
    format: ExportFormat,
) -> String {
    format!(
        "{}_{}_{}.{}",
        parameter,
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
        format.extension()
    )
}

/// Render a series as CSV with no trailing newline
pub fn to_csv(series: &[TimeSeriesPoint]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Date", "Value"])?;
    for point in series {
        writer.write_record([point.date.to_string(), point.value.to_string()])?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let mut content = String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

/// Render a result as a pretty-printed GeoJSON FeatureCollection
///
/// Results without a geometry are placed at `Point [0, 0]`.
pub fn to_geojson(result: &AnalysisResult) -> Result<String> {
    let geometry = result.geometry.clone().unwrap_or(Geometry::Point {
        coordinates: [0.0, 0.0],
    });

    let collection = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "parameter": result.parameter.id,
                "stats": result.stats,
                "timeSeries": result.time_series,
            },
            "geometry": geometry,
        }],
    });

    Ok(serde_json::to_string_pretty(&collection)?)
}

/// Render `result` in `format`
pub fn export(result: &AnalysisResult, format: ExportFormat) -> Result<ExportFile> {
    let content = match format {
        ExportFormat::Csv => to_csv(&result.time_series)?,
        ExportFormat::GeoJson => to_geojson(result)?,
        ExportFormat::Shapefile => {
            return Err(Error::UnsupportedFormat(
                "shapefile export requires server-side processing".to_string(),
            ))
        }
    };

    tracing::debug!(
        parameter = %result.parameter.id,
        format = %format,
        bytes = content.len(),
        "Exported analysis"
    );

    Ok(ExportFile {
        file_name: file_name(result.parameter.id, result.start_date, result.end_date, format),
        mime_type: format.mime_type(),
        content,
    })
}
