//! NDVI data sources
//!
//! NDVI is the one parameter with a real data path. Sources implement
//! `NdviSource`; `NdviClient` wraps the concrete backends for Clone and
//! static dispatch.
//!
//! # Configuration
//!
//! `ENVIROGEO_NDVI_URL` (or `[ndvi] url` in the config file) selects the
//! backend: an HTTP(S) base URL uses `HttpNdviSource`, the value `mock` uses
//! `MockNdviSource`, and no value leaves NDVI on synthetic data.

mod http;
mod mock;
pub mod types;

pub use http::HttpNdviSource;
pub use mock::MockNdviSource;
pub use types::{
    NationalSummary, NdviRequest, NdviResponse, NdviSeries, NdviStats, SummaryStats, YearlyValue,
};

use async_trait::async_trait;

use crate::config::NdviConfig;
use crate::error::Result;

/// Trait for NDVI retrieval backends
///
/// Failures surface as `Error::DataSource`; callers do not retry.
#[async_trait]
pub trait NdviSource: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &str;

    /// Retrieve a point series for a range of whole years
    async fn fetch_series(&self, request: &NdviRequest) -> Result<NdviSeries>;

    /// Retrieve national yearly averages
    async fn national_summary(&self) -> Result<NationalSummary>;
}

/// Concrete NDVI client enum
#[derive(Clone)]
pub enum NdviClient {
    Http(HttpNdviSource),
    Mock(MockNdviSource),
}

impl NdviClient {
    /// Create from configuration; None when no URL is configured
    pub fn from_config(config: &NdviConfig) -> Result<Option<Self>> {
        match config.url.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(url) if url.eq_ignore_ascii_case("mock") => Ok(Some(Self::mock())),
            Some(url) => Ok(Some(NdviClient::Http(HttpNdviSource::with_timeout(
                url,
                config.timeout,
            )?))),
        }
    }

    pub fn http(base_url: &str) -> Self {
        NdviClient::Http(HttpNdviSource::new(base_url))
    }

    pub fn mock() -> Self {
        NdviClient::Mock(MockNdviSource::new())
    }
}

#[async_trait]
impl NdviSource for NdviClient {
    fn name(&self) -> &str {
        match self {
            NdviClient::Http(s) => s.name(),
            NdviClient::Mock(s) => s.name(),
        }
    }

    async fn fetch_series(&self, request: &NdviRequest) -> Result<NdviSeries> {
        match self {
            NdviClient::Http(s) => s.fetch_series(request).await,
            NdviClient::Mock(s) => s.fetch_series(request).await,
        }
    }

    async fn national_summary(&self) -> Result<NationalSummary> {
        match self {
            NdviClient::Http(s) => s.national_summary().await,
            NdviClient::Mock(s) => s.national_summary().await,
        }
    }
}
