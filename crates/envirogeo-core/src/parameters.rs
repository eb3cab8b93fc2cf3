//! Static catalog of supported environmental parameters

use serde::Serialize;

use crate::models::{ParameterId, SampleLocation};

/// Fixed description of one environmental parameter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub id: ParameterId,
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    /// Lowest physically valid value
    pub min: f64,
    /// Highest physically valid value
    pub max: f64,
    /// Display color ramp, low to high
    pub palette: &'static [&'static str],
    pub icon: &'static str,
    /// Whether generated series carry a yearly oscillation
    pub seasonal: bool,
}

impl ParameterDefinition {
    /// Width of the valid range
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Middle entry of the color ramp
    pub fn display_color(&self) -> &'static str {
        self.palette[self.palette.len() / 2]
    }

    /// Clamp a value into the valid range
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

static PARAMETERS: [ParameterDefinition; 11] = [
    ParameterDefinition {
        id: ParameterId::Ndvi,
        name: "Normalized Difference Vegetation Index",
        unit: "Index (-1 to 1)",
        description: "Measures vegetation health and density using satellite imagery",
        min: -0.2,
        max: 0.9,
        palette: &["#d73027", "#fc8d59", "#fee08b", "#d9ef8b", "#91cf60", "#1a9850"],
        icon: "Leaf",
        seasonal: true,
    },
    ParameterDefinition {
        id: ParameterId::Evi,
        name: "Enhanced Vegetation Index",
        unit: "Index (0 to 1)",
        description: "Improved vegetation index optimized for high biomass regions",
        min: 0.0,
        max: 1.0,
        palette: &["#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8"],
        icon: "Trees",
        seasonal: true,
    },
    ParameterDefinition {
        id: ParameterId::AerosolIndex,
        name: "Aerosol Index",
        unit: "AI",
        description: "Indicates presence of absorbing aerosols like dust and smoke",
        min: -1.0,
        max: 5.0,
        palette: &[
            "#313695", "#4575b4", "#74add1", "#abd9e9", "#fee090", "#f46d43", "#d73027",
        ],
        icon: "Wind",
        seasonal: false,
    },
    ParameterDefinition {
        id: ParameterId::No2,
        name: "Nitrogen Dioxide",
        unit: "mol/m²",
        description: "Air pollutant from combustion, indicates traffic and industrial activity",
        min: 0.0,
        max: 0.0003,
        palette: &["#4575b4", "#91bfdb", "#e0f3f8", "#fee090", "#fc8d59", "#d73027"],
        icon: "Factory",
        seasonal: false,
    },
    ParameterDefinition {
        id: ParameterId::So2,
        name: "Sulfur Dioxide",
        unit: "mol/m²",
        description: "Gas produced by volcanic activity and industrial processes",
        min: 0.0,
        max: 0.001,
        palette: &[
            "#762a83", "#9970ab", "#c2a5cf", "#e7d4e8", "#d9f0d3", "#a6dba0", "#5aae61",
        ],
        icon: "Flame",
        seasonal: false,
    },
    ParameterDefinition {
        id: ParameterId::Co,
        name: "Carbon Monoxide",
        unit: "mol/m²",
        description: "Colorless gas from incomplete combustion",
        min: 0.0,
        max: 0.05,
        palette: &["#2166ac", "#67a9cf", "#d1e5f0", "#fddbc7", "#ef8a62", "#b2182b"],
        icon: "CloudFog",
        seasonal: false,
    },
    ParameterDefinition {
        id: ParameterId::SoilMoisture,
        name: "Soil Moisture",
        unit: "mm",
        description: "Water content in the top layer of soil",
        min: 0.0,
        max: 100.0,
        palette: &[
            "#8c510a", "#bf812d", "#dfc27d", "#f6e8c3", "#c7eae5", "#80cdc1", "#35978f",
            "#01665e",
        ],
        icon: "Droplets",
        seasonal: false,
    },
    ParameterDefinition {
        id: ParameterId::Rainfall,
        name: "Precipitation",
        unit: "mm/day",
        description: "Daily rainfall amount",
        min: 0.0,
        max: 100.0,
        palette: &[
            "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5",
            "#084594",
        ],
        icon: "CloudRain",
        seasonal: true,
    },
    ParameterDefinition {
        id: ParameterId::Lst,
        name: "Land Surface Temperature",
        unit: "°C",
        description: "Temperature of the Earth's surface",
        min: -10.0,
        max: 50.0,
        palette: &[
            "#313695", "#4575b4", "#74add1", "#abd9e9", "#fee090", "#fdae61", "#f46d43",
            "#d73027",
        ],
        icon: "Thermometer",
        seasonal: true,
    },
    ParameterDefinition {
        id: ParameterId::Et,
        name: "Evapotranspiration",
        unit: "kg/m²/8day",
        description: "Combined evaporation and plant transpiration",
        min: 0.0,
        max: 100.0,
        palette: &[
            "#ffffd4", "#fee391", "#fec44f", "#fe9929", "#ec7014", "#cc4c02", "#8c2d04",
        ],
        icon: "Waves",
        seasonal: true,
    },
    ParameterDefinition {
        id: ParameterId::Aqi,
        name: "Air Quality Index",
        unit: "AQI",
        description: "Composite measure of air quality",
        min: 0.0,
        max: 500.0,
        palette: &["#00e400", "#ffff00", "#ff7e00", "#ff0000", "#8f3f97", "#7e0023"],
        icon: "Wind",
        seasonal: false,
    },
];

/// Look up the definition for a parameter
pub fn definition(id: ParameterId) -> &'static ParameterDefinition {
    // Catalog order matches ParameterId::ALL
    &PARAMETERS[id as usize]
}

/// All parameter definitions in catalog order
pub fn all() -> &'static [ParameterDefinition] {
    &PARAMETERS
}

/// Starting points offered on the map
pub const SAMPLE_LOCATIONS: [SampleLocation; 6] = [
    SampleLocation {
        name: "Amazon Rainforest",
        coordinates: [-60.0, -3.0],
        zoom: 6,
    },
    SampleLocation {
        name: "Sahara Desert",
        coordinates: [10.0, 23.0],
        zoom: 5,
    },
    SampleLocation {
        name: "European Alps",
        coordinates: [10.0, 46.5],
        zoom: 7,
    },
    SampleLocation {
        name: "Tokyo Metro",
        coordinates: [139.7, 35.7],
        zoom: 10,
    },
    SampleLocation {
        name: "Great Barrier Reef",
        coordinates: [147.0, -18.0],
        zoom: 6,
    },
    SampleLocation {
        name: "California Coast",
        coordinates: [-122.0, 37.0],
        zoom: 8,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_ids() {
        for id in ParameterId::ALL {
            assert_eq!(definition(id).id, id);
        }
        assert_eq!(all().len(), ParameterId::ALL.len());
    }

    #[test]
    fn test_ranges_are_valid() {
        for def in all() {
            assert!(def.max > def.min, "{} has empty range", def.id);
            assert!(!def.palette.is_empty());
        }
    }

    #[test]
    fn test_seasonal_subset() {
        let seasonal: Vec<_> = all().iter().filter(|d| d.seasonal).map(|d| d.id).collect();
        assert_eq!(
            seasonal,
            vec![
                ParameterId::Ndvi,
                ParameterId::Evi,
                ParameterId::Rainfall,
                ParameterId::Lst,
                ParameterId::Et
            ]
        );
    }

    #[test]
    fn test_display_color_is_middle_of_ramp() {
        // Six-entry ramp -> index 3
        assert_eq!(ParameterId::Ndvi.definition().display_color(), "#d9ef8b");
        // Seven-entry ramp -> index 3
        assert_eq!(ParameterId::So2.definition().display_color(), "#e7d4e8");
    }

    #[test]
    fn test_clamp() {
        let def = ParameterId::Aqi.definition();
        assert_eq!(def.clamp(-5.0), 0.0);
        assert_eq!(def.clamp(600.0), 500.0);
        assert_eq!(def.clamp(42.0), 42.0);
    }
}
