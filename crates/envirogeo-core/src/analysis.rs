//! Analysis orchestration
//!
//! Validates a request, then either asks the configured NDVI source for real
//! data or runs the synthetic pipeline (generate, reduce, describe).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::area::{validate_date_range, AreaSelection, Bounds, ResolvedArea, SUPPORTED_REGION};
use crate::error::{Error, Result};
use crate::insights::compute_insights;
use crate::models::{AnalysisResult, ParameterId, ParameterSummary};
use crate::ndvi::{NationalSummary, NdviClient, NdviRequest, NdviSource};
use crate::series;
use crate::stats::compute_stats;

/// One analysis as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub parameter: ParameterId,
    pub area: AreaSelection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Runs analyses, routing NDVI to a real source when one is configured
#[derive(Clone)]
pub struct Analyzer {
    ndvi: Option<NdviClient>,
    region: Bounds,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Analyzer {
    pub fn new(ndvi: Option<NdviClient>) -> Self {
        Self {
            ndvi,
            region: SUPPORTED_REGION,
        }
    }

    /// Restrict analyses to a different region
    pub fn with_region(mut self, region: Bounds) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> &Bounds {
        &self.region
    }

    pub fn ndvi_source(&self) -> Option<&NdviClient> {
        self.ndvi.as_ref()
    }

    /// Validate and run one analysis
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let area = request.area.resolve()?;
        area.ensure_within(&self.region)?;
        validate_date_range(request.start_date, request.end_date)?;

        let result = match (&self.ndvi, request.parameter) {
            (Some(source), ParameterId::Ndvi) => {
                self.analyze_real(source, &area, request.start_date, request.end_date)
                    .await?
            }
            _ => analyze_synthetic(request.parameter, area, request.start_date, request.end_date)?,
        };

        info!(
            parameter = %request.parameter,
            points = result.time_series.len(),
            trend = %result.stats.trend,
            source = result.source.as_deref().unwrap_or("synthetic"),
            "Analysis complete"
        );
        Ok(result)
    }

    async fn analyze_real(
        &self,
        source: &NdviClient,
        area: &ResolvedArea,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisResult> {
        let request = NdviRequest {
            lat: area.lat,
            lon: area.lon,
            start_year: start.year(),
            end_year: end.year(),
        };
        let series = source.fetch_series(&request).await?;

        Ok(AnalysisResult {
            parameter: ParameterSummary::from(ParameterId::Ndvi),
            time_series: series.time_series,
            stats: series.stats,
            insights: series.insights,
            start_date: start,
            end_date: end,
            geometry: Some(area.geometry.clone()),
            geometry_type: Some(area.geometry_type.clone()),
            source: Some(series.source),
        })
    }

    /// National NDVI summary from the configured source
    pub async fn national_summary(&self) -> Result<NationalSummary> {
        match &self.ndvi {
            Some(source) => source.national_summary().await,
            None => Err(Error::DataSource(
                "No NDVI data source configured".to_string(),
            )),
        }
    }
}

/// Synthetic pipeline for a resolved area; rejects an invalid date range
pub fn analyze_synthetic(
    parameter: ParameterId,
    area: ResolvedArea,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AnalysisResult> {
    validate_date_range(start, end)?;

    let time_series = series::generate(parameter, start, end);
    let stats = compute_stats(&time_series);
    let insights = compute_insights(parameter, &stats);

    Ok(AnalysisResult {
        parameter: ParameterSummary::from(parameter),
        time_series,
        stats,
        insights,
        start_date: start,
        end_date: end,
        geometry: Some(area.geometry),
        geometry_type: Some(area.geometry_type),
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;
    use crate::ndvi::MockNdviSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(parameter: ParameterId) -> AnalysisRequest {
        AnalysisRequest {
            parameter,
            area: AreaSelection::Coordinates {
                lat: "31.5204".into(),
                lon: "74.3587".into(),
            },
            start_date: date(2021, 1, 1),
            end_date: date(2021, 12, 31),
        }
    }

    #[tokio::test]
    async fn test_synthetic_analysis() {
        let result = Analyzer::default().analyze(&request(ParameterId::Aqi)).await.unwrap();
        assert_eq!(result.parameter.id, ParameterId::Aqi);
        assert_eq!(result.parameter.color, "#ff0000");
        assert!(!result.time_series.is_empty());
        assert!(result.time_series.len() <= 91);
        assert!(result.stats.min <= result.stats.mean && result.stats.mean <= result.stats.max);
        assert!(result.insights[0].starts_with("Air Quality Index"));
        assert_eq!(result.geometry, Some(Geometry::point(31.5204, 74.3587)));
        assert_eq!(result.geometry_type.as_deref(), Some("point"));
        assert!(result.source.is_none());
    }

    #[tokio::test]
    async fn test_ndvi_without_source_is_synthetic() {
        let result = Analyzer::default().analyze(&request(ParameterId::Ndvi)).await.unwrap();
        assert!(result.source.is_none());
    }

    #[tokio::test]
    async fn test_ndvi_with_source_uses_real_path() {
        let analyzer = Analyzer::new(Some(NdviClient::mock()));
        let result = analyzer.analyze(&request(ParameterId::Ndvi)).await.unwrap();
        assert_eq!(result.source.as_deref(), Some("Mock NDVI"));
        assert_eq!(result.start_date, date(2021, 1, 1));

        // Other parameters stay synthetic
        let other = analyzer.analyze(&request(ParameterId::Lst)).await.unwrap();
        assert!(other.source.is_none());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let analyzer = Analyzer::new(Some(NdviClient::Mock(MockNdviSource::failing("boom"))));
        let err = analyzer.analyze(&request(ParameterId::Ndvi)).await.unwrap_err();
        assert!(matches!(err, Error::DataSource(m) if m == "boom"));
    }

    #[tokio::test]
    async fn test_validation_happens_first() {
        let analyzer = Analyzer::new(Some(NdviClient::Mock(MockNdviSource::failing("unreached"))));

        let mut outside = request(ParameterId::Ndvi);
        outside.area = AreaSelection::Coordinates {
            lat: 51.5.into(),
            lon: (-0.12).into(),
        };
        let err = analyzer.analyze(&outside).await.unwrap_err();
        assert!(err.to_string().starts_with("Location outside supported region"));

        let mut missing = request(ParameterId::Ndvi);
        missing.area = AreaSelection::Coordinates {
            lat: "".into(),
            lon: "".into(),
        };
        let err = analyzer.analyze(&missing).await.unwrap_err();
        assert!(err.to_string().starts_with("No area selected"));

        let mut reversed = request(ParameterId::Co);
        reversed.start_date = date(2022, 1, 1);
        reversed.end_date = date(2021, 1, 1);
        assert!(matches!(analyzer.analyze(&reversed).await, Err(Error::Validation(_))));
    }

    #[test]
    fn test_synthetic_rejects_reversed_range() {
        let area = request(ParameterId::Rainfall).area.resolve().unwrap();

        let err = analyze_synthetic(
            ParameterId::Rainfall,
            area.clone(),
            date(2022, 3, 1),
            date(2022, 2, 1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let result =
            analyze_synthetic(ParameterId::Rainfall, area, date(2022, 2, 1), date(2022, 3, 1))
                .unwrap();
        assert!(!result.time_series.is_empty());
    }

    #[tokio::test]
    async fn test_custom_region() {
        let analyzer = Analyzer::default().with_region(Bounds {
            min_lat: 0.0,
            max_lat: 10.0,
            min_lon: 0.0,
            max_lon: 10.0,
        });
        assert!(analyzer.analyze(&request(ParameterId::Co)).await.is_err());
    }

    #[tokio::test]
    async fn test_national_summary_requires_source() {
        assert!(Analyzer::default().national_summary().await.is_err());
        let summary = Analyzer::new(Some(NdviClient::mock()))
            .national_summary()
            .await
            .unwrap();
        assert_eq!(summary.yearly.len(), 6);
    }

    #[test]
    fn test_request_json_shape() {
        let json = serde_json::json!({
            "parameter": "Soil Moisture",
            "area": {"mode": "boundingBox", "north": "32", "south": "30", "east": "74", "west": "72"},
            "startDate": "2020-01-01",
            "endDate": "2020-06-30"
        });
        let req: AnalysisRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.parameter, ParameterId::SoilMoisture);
        assert_eq!(req.end_date, date(2020, 6, 30));
    }
}
