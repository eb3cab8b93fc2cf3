//! Deterministic in-process NDVI source for development and tests

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::insights::compute_insights;
use crate::models::ParameterId;
use crate::series::generate_with_rng;
use crate::stats::compute_stats;

use super::types::{NationalSummary, NdviRequest, NdviSeries, SummaryStats, YearlyValue};
use super::NdviSource;

const MOCK_SOURCE: &str = "Mock NDVI";

/// National yearly averages served by the mock
const NATIONAL_AVERAGES: [(&str, f64); 6] = [
    ("2019", 0.312),
    ("2020", 0.298),
    ("2021", 0.325),
    ("2022", 0.331),
    ("2023", 0.317),
    ("2024", 0.342),
];

/// Mock NDVI source
///
/// The same request always yields the same series. A failing mock returns
/// its message as a data-source error from every call.
#[derive(Clone, Default)]
pub struct MockNdviSource {
    failure: Option<String>,
}

impl MockNdviSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
        }
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::DataSource(message.clone())),
            None => Ok(()),
        }
    }
}

fn seed_for(request: &NdviRequest) -> u64 {
    request.lat.to_bits()
        ^ request.lon.to_bits().rotate_left(17)
        ^ ((request.start_year as u64) << 32)
        ^ request.end_year as u64
}

#[async_trait]
impl NdviSource for MockNdviSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_series(&self, request: &NdviRequest) -> Result<NdviSeries> {
        self.check()?;

        let start = NaiveDate::from_ymd_opt(request.start_year, 1, 1)
            .ok_or_else(|| Error::Validation(format!("Invalid start year {}", request.start_year)))?;
        let end = NaiveDate::from_ymd_opt(request.end_year, 12, 31)
            .ok_or_else(|| Error::Validation(format!("Invalid end year {}", request.end_year)))?;

        let mut rng = StdRng::seed_from_u64(seed_for(request));
        let time_series = generate_with_rng(ParameterId::Ndvi, start, end, &mut rng);
        if time_series.is_empty() {
            return Err(Error::DataSource(
                "NDVI service returned an empty series".to_string(),
            ));
        }

        let stats = compute_stats(&time_series);
        let insights = compute_insights(ParameterId::Ndvi, &stats);

        Ok(NdviSeries {
            time_series,
            stats,
            insights,
            source: MOCK_SOURCE.to_string(),
        })
    }

    async fn national_summary(&self) -> Result<NationalSummary> {
        self.check()?;

        let yearly: Vec<YearlyValue> = NATIONAL_AVERAGES
            .iter()
            .map(|(year, value)| YearlyValue {
                year: year.to_string(),
                value: *value,
            })
            .collect();
        let stats = SummaryStats {
            mean: 0.3208,
            min: 0.298,
            max: 0.342,
        };
        let insights = vec![
            "National vegetation cover remained sparse to moderate between 2019 and 2024.".to_string(),
            "Vegetation greenness improved overall, led by gains in 2021 and 2024.".to_string(),
        ];

        Ok(NationalSummary::new(yearly, stats, insights))
    }
}
