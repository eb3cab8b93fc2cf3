//! EnviroGeo Core Library
//!
//! Shared functionality for the EnviroGeo environmental monitoring service:
//! - Parameter catalog with ranges, units and color ramps
//! - Synthetic series generation, statistics and insights
//! - Area selection and request validation
//! - NDVI retrieval from an external service
//! - Document store for profiles and saved analyses
//! - CSV and GeoJSON export

pub mod analysis;
pub mod area;
pub mod config;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod ndvi;
pub mod parameters;
pub mod series;
pub mod stats;
pub mod store;

/// Test utilities including a mock NDVI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{analyze_synthetic, AnalysisRequest, Analyzer};
pub use area::{AreaSelection, Bounds, CoordinateInput, ResolvedArea, SUPPORTED_REGION};
pub use config::{AppConfig, NdviConfig, ServerSettings, StoreBackend, StoreConfig};
pub use error::{Error, Result};
pub use export::{ExportFile, ExportFormat};
pub use insights::{compute_insights, InsightEngine, InsightRule};
pub use models::{
    AnalysisBundle, AnalysisRecord, AnalysisResult, Geometry, NewAnalysis, ParameterId,
    ParameterSummary, ProfileUpdate, SampleLocation, Stats, TimeSeriesPoint, Trend,
};
pub use ndvi::{NationalSummary, NdviClient, NdviSource};
pub use parameters::ParameterDefinition;
pub use stats::compute_stats;
pub use store::{
    Document, DocumentStore, Filter, MemoryStore, SqliteStore, StoreClient, StoreRequest,
    StoreResponse, UpsertResult,
};
