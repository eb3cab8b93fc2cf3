//! Request and response shapes for the NDVI service

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Stats, TimeSeriesPoint, Trend, STABLE_TREND_THRESHOLD};
use crate::series::{round1, round4};
use crate::stats::compute_stats;

/// Point query sent to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviRequest {
    pub lat: f64,
    pub lon: f64,
    pub start_year: i32,
    pub end_year: i32,
}

/// Statistics block as the service reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub std_dev: f64,
    #[serde(default)]
    pub trend_percent: f64,
}

impl NdviStats {
    /// Map onto local statistics, labelling the supplied trend percentage
    pub fn to_stats(&self) -> Stats {
        Stats {
            mean: self.mean,
            min: self.min,
            max: self.max,
            std_dev: self.std_dev,
            trend: Trend::from_percent(self.trend_percent),
            trend_percent: self.trend_percent,
        }
    }
}

/// Raw point-query response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviResponse {
    #[serde(default)]
    pub time_series: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub stats: Option<NdviStats>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Series retrieved from a real data source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviSeries {
    pub time_series: Vec<TimeSeriesPoint>,
    pub stats: Stats,
    pub insights: Vec<String>,
    pub source: String,
}

const DEFAULT_SOURCE: &str = "NDVI service";

impl NdviResponse {
    /// Validate and convert; an embedded error or an empty series is a failure
    pub fn into_series(self) -> Result<NdviSeries> {
        if let Some(error) = self.error {
            return Err(Error::DataSource(error));
        }
        if self.time_series.is_empty() {
            return Err(Error::DataSource(
                "NDVI service returned an empty series".to_string(),
            ));
        }

        let stats = match self.stats {
            Some(stats) => stats.to_stats(),
            None => compute_stats(&self.time_series),
        };

        Ok(NdviSeries {
            time_series: self.time_series,
            stats,
            insights: self.insights,
            source: self.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
    }
}

/// Basic statistics for the national summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Raw national-range response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalResponse {
    #[serde(default)]
    pub yearly_averages: BTreeMap<String, f64>,
    #[serde(default)]
    pub stats: Option<SummaryStats>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyValue {
    pub year: String,
    pub value: f64,
}

/// Country-wide yearly NDVI averages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalSummary {
    /// Ordered by year
    pub yearly: Vec<YearlyValue>,
    pub stats: SummaryStats,
    pub insights: Vec<String>,
    /// First-to-last change; absent with fewer than two years or a zero first year
    pub change_percent: Option<f64>,
    pub trend: Trend,
}

impl NationalSummary {
    pub fn new(yearly: Vec<YearlyValue>, stats: SummaryStats, insights: Vec<String>) -> Self {
        let change = match (yearly.first(), yearly.last()) {
            (Some(first), Some(last)) if yearly.len() >= 2 && first.value != 0.0 => {
                Some((last.value - first.value) / first.value * 100.0)
            }
            _ => None,
        };
        // Labelled from the unrounded change, strictly beyond the threshold
        let trend = match change {
            Some(c) if c > STABLE_TREND_THRESHOLD => Trend::Increasing,
            Some(c) if c < -STABLE_TREND_THRESHOLD => Trend::Decreasing,
            _ => Trend::Stable,
        };
        let change_percent = change.map(|c| round1(c) + 0.0);

        Self {
            yearly,
            stats,
            insights,
            change_percent,
            trend,
        }
    }
}

impl NationalResponse {
    pub fn into_summary(self) -> Result<NationalSummary> {
        if let Some(error) = self.error {
            return Err(Error::DataSource(error));
        }
        if self.yearly_averages.is_empty() {
            return Err(Error::DataSource(
                "NDVI service returned no yearly averages".to_string(),
            ));
        }

        // BTreeMap keeps years in order
        let yearly: Vec<YearlyValue> = self
            .yearly_averages
            .into_iter()
            .map(|(year, value)| YearlyValue { year, value })
            .collect();

        let stats = self.stats.unwrap_or_else(|| summarize(&yearly));
        Ok(NationalSummary::new(yearly, stats, self.insights))
    }
}

fn summarize(yearly: &[YearlyValue]) -> SummaryStats {
    let n = yearly.len() as f64;
    let values = yearly.iter().map(|y| y.value);
    SummaryStats {
        mean: round4(values.clone().sum::<f64>() / n),
        min: round4(values.clone().fold(f64::INFINITY, f64::min)),
        max: round4(values.fold(f64::NEG_INFINITY, f64::max)),
    }
}
