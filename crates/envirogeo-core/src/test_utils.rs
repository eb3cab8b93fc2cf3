//! Test utilities for envirogeo-core
//!
//! Provides a mock NDVI HTTP service so the real client path can be
//! exercised end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Canned replies served by [`MockNdviServer`]
#[derive(Clone)]
pub struct MockNdviReplies {
    pub status: StatusCode,
    pub series: Value,
    pub national: Value,
}

impl Default for MockNdviReplies {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            series: json!({
                "timeSeries": [
                    {"date": "2020-01-01", "value": 0.31},
                    {"date": "2020-07-01", "value": 0.42},
                    {"date": "2021-01-01", "value": 0.33},
                    {"date": "2021-07-01", "value": 0.45}
                ],
                "stats": {
                    "mean": 0.3775,
                    "min": 0.31,
                    "max": 0.45,
                    "stdDev": 0.0589,
                    "trendPercent": 8.3
                },
                "insights": ["Vegetation greenness increased over the period."],
                "source": "MODIS Terra Vegetation Indices"
            }),
            national: json!({
                "yearlyAverages": {"2019": 0.30, "2020": 0.31, "2021": 0.29, "2022": 0.30},
                "stats": {"mean": 0.3, "min": 0.29, "max": 0.31},
                "insights": ["National NDVI is broadly stable."]
            }),
        }
    }
}

/// Mock NDVI service for integration tests
pub struct MockNdviServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockNdviServer {
    /// Start with the default replies on an available port
    pub async fn start() -> Self {
        Self::start_with(MockNdviReplies::default()).await
    }

    /// Start serving the given replies
    pub async fn start_with(replies: MockNdviReplies) -> Self {
        let app = Router::new()
            .route("/get-ndvi", post(handle_series))
            .route("/get-ndvi-pakistan-range", post(handle_national))
            .with_state(Arc::new(replies));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockNdviServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_series(
    State(replies): State<Arc<MockNdviReplies>>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // Reject bodies the real service would not understand
    let well_formed = ["lat", "lon", "startYear", "endYear"]
        .iter()
        .all(|field| request.get(field).is_some_and(Value::is_number));
    if !well_formed {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "lat, lon, startYear and endYear are required"})),
        );
    }
    (replies.status, Json(replies.series.clone()))
}

async fn handle_national(State(replies): State<Arc<MockNdviReplies>>) -> (StatusCode, Json<Value>) {
    (replies.status, Json(replies.national.clone()))
}
