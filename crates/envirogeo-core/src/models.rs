//! Data models for EnviroGeo

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::parameters::ParameterDefinition;

/// Supported environmental parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterId {
    #[serde(rename = "NDVI")]
    Ndvi,
    #[serde(rename = "EVI")]
    Evi,
    #[serde(rename = "Aerosol Index")]
    AerosolIndex,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "Soil Moisture")]
    SoilMoisture,
    #[serde(rename = "Rainfall")]
    Rainfall,
    #[serde(rename = "LST")]
    Lst,
    #[serde(rename = "ET")]
    Et,
    #[serde(rename = "AQI")]
    Aqi,
}

impl ParameterId {
    /// All parameters in catalog order
    pub const ALL: [ParameterId; 11] = [
        ParameterId::Ndvi,
        ParameterId::Evi,
        ParameterId::AerosolIndex,
        ParameterId::No2,
        ParameterId::So2,
        ParameterId::Co,
        ParameterId::SoilMoisture,
        ParameterId::Rainfall,
        ParameterId::Lst,
        ParameterId::Et,
        ParameterId::Aqi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterId::Ndvi => "NDVI",
            ParameterId::Evi => "EVI",
            ParameterId::AerosolIndex => "Aerosol Index",
            ParameterId::No2 => "NO2",
            ParameterId::So2 => "SO2",
            ParameterId::Co => "CO",
            ParameterId::SoilMoisture => "Soil Moisture",
            ParameterId::Rainfall => "Rainfall",
            ParameterId::Lst => "LST",
            ParameterId::Et => "ET",
            ParameterId::Aqi => "AQI",
        }
    }

    /// Static definition (range, unit, palette) for this parameter
    pub fn definition(&self) -> &'static ParameterDefinition {
        crate::parameters::definition(*self)
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterId {
    type Err = Error;

    /// Accepts the display id ("Soil Moisture") case-insensitively, plus
    /// snake/kebab spellings ("soil_moisture", "aerosol-index").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        ParameterId::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().to_lowercase() == normalized)
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

/// One dated observation in a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Lower uncertainty bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper uncertainty bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            min: None,
            max: None,
        }
    }
}

/// Qualitative direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Trend percentages with a magnitude below this are labelled stable
pub const STABLE_TREND_THRESHOLD: f64 = 2.0;

impl Trend {
    /// Label a signed trend percentage
    pub fn from_percent(trend_percent: f64) -> Self {
        if trend_percent.abs() < STABLE_TREND_THRESHOLD {
            Trend::Stable
        } else if trend_percent > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary statistics derived from a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub trend: Trend,
    /// Signed linear trend, as a percentage of the mean
    pub trend_percent: f64,
}

/// GeoJSON geometry for an analysed area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[lon, lat]`
    Point { coordinates: [f64; 2] },
    /// Rings of `[lon, lat]` positions, outer ring first
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    pub fn point(lat: f64, lon: f64) -> Self {
        Geometry::Point {
            coordinates: [lon, lat],
        }
    }
}

/// Parameter identity as shown alongside a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub id: ParameterId,
    pub name: String,
    pub unit: String,
    /// Representative color from the parameter's ramp
    pub color: String,
}

impl From<ParameterId> for ParameterSummary {
    fn from(id: ParameterId) -> Self {
        let def = id.definition();
        Self {
            id,
            name: def.name.to_string(),
            unit: def.unit.to_string(),
            color: def.display_color().to_string(),
        }
    }
}

/// Complete output of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub parameter: ParameterSummary,
    pub time_series: Vec<TimeSeriesPoint>,
    pub stats: Stats,
    pub insights: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub geometry_type: Option<String>,
    /// Name of the external data provider, for real-data results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl AnalysisResult {
    /// Build the persistable form of this result
    pub fn to_new_analysis(&self) -> NewAnalysis {
        NewAnalysis {
            parameter: self.parameter.id,
            geometry: self.geometry.clone(),
            geometry_type: self.geometry_type.clone().unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            results: AnalysisBundle {
                time_series: self.time_series.clone(),
                stats: self.stats.clone(),
                insights: self.insights.clone(),
            },
        }
    }
}

/// Series, statistics and insights stored together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub time_series: Vec<TimeSeriesPoint>,
    pub stats: Stats,
    pub insights: Vec<String>,
}

/// An analysis about to be saved to a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalysis {
    pub parameter: ParameterId,
    pub geometry: Option<Geometry>,
    pub geometry_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub results: AnalysisBundle,
}

/// A saved analysis owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub parameter: ParameterId,
    pub geometry: Option<Geometry>,
    pub geometry_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub results: AnalysisBundle,
    pub created_at: DateTime<Utc>,
}

/// Profile fields a user may set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Named map location offered as a starting point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleLocation {
    pub name: &'static str,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
    pub zoom: u8,
}
