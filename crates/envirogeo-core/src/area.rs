//! Area selection and request validation
//!
//! An analysis targets a single point. Users pick it by drawing on the map,
//! typing coordinates, or entering a bounding box; each mode resolves to the
//! analysis point plus the geometry stored with the result.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Geometry;

/// Geographic rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Region covered by the data services
pub const SUPPORTED_REGION: Bounds = Bounds {
    min_lat: 23.5,
    max_lat: 37.1,
    min_lon: 60.9,
    max_lon: 77.5,
};

/// First year with data available
pub const FIRST_YEAR: i32 = 2019;

/// Last year with data available
pub const LAST_YEAR: i32 = 2024;

/// A coordinate as typed by the user, either a JSON number or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    /// Finite numeric value, if the input is one
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            CoordinateInput::Number(n) => *n,
            CoordinateInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for CoordinateInput {
    fn from(v: f64) -> Self {
        CoordinateInput::Number(v)
    }
}

impl From<&str> for CoordinateInput {
    fn from(s: &str) -> Self {
        CoordinateInput::Text(s.to_string())
    }
}

/// How the user selected the area to analyse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum AreaSelection {
    /// Shape drawn on the map
    Drawn {
        geometry: Geometry,
        /// Shape tool used (point, polygon, rectangle, circle...)
        #[serde(default, rename = "shapeType")]
        shape_type: Option<String>,
    },
    /// Single latitude/longitude pair
    Coordinates {
        lat: CoordinateInput,
        lon: CoordinateInput,
    },
    /// Rectangle given by its edges
    BoundingBox {
        north: CoordinateInput,
        south: CoordinateInput,
        east: CoordinateInput,
        west: CoordinateInput,
    },
}

/// An area reduced to its analysis point and stored geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArea {
    pub lat: f64,
    pub lon: f64,
    pub geometry: Geometry,
    pub geometry_type: String,
}

fn no_area() -> Error {
    Error::Validation(
        "No area selected. Please draw a shape on the map or enter coordinates.".to_string(),
    )
}

impl AreaSelection {
    /// Resolve to an analysis point; fails when fields are missing or non-numeric
    pub fn resolve(&self) -> Result<ResolvedArea> {
        match self {
            AreaSelection::Drawn {
                geometry,
                shape_type,
            } => {
                let (lat, lon, default_type) = match geometry {
                    Geometry::Point { coordinates } => (coordinates[1], coordinates[0], "point"),
                    Geometry::Polygon { coordinates } => {
                        let ring = coordinates.first().filter(|r| !r.is_empty()).ok_or_else(no_area)?;
                        let n = ring.len() as f64;
                        let lat = ring.iter().map(|p| p[1]).sum::<f64>() / n;
                        let lon = ring.iter().map(|p| p[0]).sum::<f64>() / n;
                        (lat, lon, "polygon")
                    }
                };
                if !lat.is_finite() || !lon.is_finite() {
                    return Err(no_area());
                }
                Ok(ResolvedArea {
                    lat,
                    lon,
                    geometry: geometry.clone(),
                    geometry_type: shape_type.clone().unwrap_or_else(|| default_type.to_string()),
                })
            }
            AreaSelection::Coordinates { lat, lon } => {
                let (lat, lon) = (lat.value().ok_or_else(no_area)?, lon.value().ok_or_else(no_area)?);
                Ok(ResolvedArea {
                    lat,
                    lon,
                    geometry: Geometry::point(lat, lon),
                    geometry_type: "point".to_string(),
                })
            }
            AreaSelection::BoundingBox {
                north,
                south,
                east,
                west,
            } => {
                let north = north.value().ok_or_else(no_area)?;
                let south = south.value().ok_or_else(no_area)?;
                let east = east.value().ok_or_else(no_area)?;
                let west = west.value().ok_or_else(no_area)?;
                Ok(ResolvedArea {
                    lat: (north + south) / 2.0,
                    lon: (east + west) / 2.0,
                    geometry: Geometry::Polygon {
                        coordinates: vec![vec![
                            [west, north],
                            [east, north],
                            [east, south],
                            [west, south],
                            [west, north],
                        ]],
                    },
                    geometry_type: "rectangle".to_string(),
                })
            }
        }
    }
}

impl ResolvedArea {
    /// Reject points outside the given bounds
    pub fn ensure_within(&self, bounds: &Bounds) -> Result<()> {
        if bounds.contains(self.lat, self.lon) {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Location outside supported region. Data is only available for latitudes {}-{} and longitudes {}-{}.",
                bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
            )))
        }
    }
}

/// Check that a date range is ordered and inside the supported years
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::Validation(
            "Start date must not be after end date.".to_string(),
        ));
    }
    for d in [start, end] {
        if d.year() < FIRST_YEAR || d.year() > LAST_YEAR {
            return Err(Error::Validation(format!(
                "Dates must fall between {} and {}.",
                FIRST_YEAR, LAST_YEAR
            )));
        }
    }
    Ok(())
}
