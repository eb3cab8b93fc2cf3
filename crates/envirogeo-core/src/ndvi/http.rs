//! HTTP client for the external NDVI service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{NationalResponse, NationalSummary, NdviRequest, NdviResponse, NdviSeries};
use super::NdviSource;

/// NDVI service reached over HTTP
///
/// Exposes two JSON POST endpoints under one base URL: `get-ndvi` for point
/// queries and `get-ndvi-pakistan-range` for the national summary.
#[derive(Clone)]
pub struct HttpNdviSource {
    http_client: Client,
    base_url: String,
}

impl HttpNdviSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create with a per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, "Calling NDVI service");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::DataSource(format!("NDVI service unreachable: {}", e)))?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::DataSource(format!("Invalid NDVI service response: {}", e)))
    }
}

/// Turn a non-2xx response into an error, preferring the body's `error` field
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| format!("NDVI service returned {}", status));
    Err(Error::DataSource(message))
}

#[async_trait]
impl NdviSource for HttpNdviSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_series(&self, request: &NdviRequest) -> Result<NdviSeries> {
        let body = serde_json::to_value(request)?;
        let response: NdviResponse = self.post("get-ndvi", body).await?;
        response.into_series()
    }

    async fn national_summary(&self) -> Result<NationalSummary> {
        let response: NationalResponse = self.post("get-ndvi-pakistan-range", json!({})).await?;
        response.into_summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trend;
    use crate::test_utils::{MockNdviReplies, MockNdviServer};
    use axum::http::StatusCode;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let source = HttpNdviSource::new("http://localhost:8080/");
        assert_eq!(source.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_fetch_series_from_service() {
        let server = MockNdviServer::start().await;
        let source = HttpNdviSource::new(&server.url());
        let series = source
            .fetch_series(&NdviRequest {
                lat: 31.5,
                lon: 74.3,
                start_year: 2020,
                end_year: 2021,
            })
            .await
            .unwrap();
        assert_eq!(series.time_series.len(), 4);
        assert_eq!(series.stats.trend_percent, 8.3);
        assert_eq!(series.stats.trend, Trend::Increasing);
        assert_eq!(series.source, "MODIS Terra Vegetation Indices");
    }

    #[tokio::test]
    async fn test_national_summary_from_service() {
        let server = MockNdviServer::start().await;
        let summary = HttpNdviSource::new(&server.url())
            .national_summary()
            .await
            .unwrap();
        assert_eq!(summary.yearly[0].year, "2019");
        assert_eq!(summary.change_percent, Some(0.0));
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_non_success_status_uses_error_body() {
        let server = MockNdviServer::start_with(MockNdviReplies {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            series: json!({"error": "Earth Engine unavailable"}),
            national: json!({}),
        })
        .await;
        let source = HttpNdviSource::new(&server.url());
        let err = source
            .fetch_series(&NdviRequest {
                lat: 30.0,
                lon: 70.0,
                start_year: 2019,
                end_year: 2019,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DataSource(m) if m == "Earth Engine unavailable"));

        let err = source.national_summary().await.unwrap_err();
        assert!(matches!(err, Error::DataSource(m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_embedded_error_with_ok_status() {
        let server = MockNdviServer::start_with(MockNdviReplies {
            status: StatusCode::OK,
            series: json!({"error": "No imagery for location"}),
            national: json!({"error": "No imagery"}),
        })
        .await;
        let source = HttpNdviSource::new(&server.url());
        assert!(source.national_summary().await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_data_source_error() {
        // Port 9 (discard) is not listening on loopback in test environments
        let source = HttpNdviSource::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = source.national_summary().await.unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }
}
