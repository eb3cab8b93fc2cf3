//! Integration tests for envirogeo-core
//!
//! These tests exercise the analyze → save → history → export workflow.

use chrono::NaiveDate;
use envirogeo_core::{
    export::{self, ExportFormat},
    models::{AnalysisRecord, ParameterId, Trend},
    store::{to_document, ANALYSIS_HISTORY, PROFILES},
    AnalysisRequest, Analyzer, AppConfig, AreaSelection, DocumentStore, NdviClient,
    ProfileUpdate, StoreBackend, StoreClient, StoreRequest,
};
use serde_json::json;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lahore(parameter: ParameterId) -> AnalysisRequest {
    AnalysisRequest {
        parameter,
        area: AreaSelection::Coordinates {
            lat: "31.5204".into(),
            lon: "74.3587".into(),
        },
        start_date: date(2019, 1, 1),
        end_date: date(2024, 12, 31),
    }
}

fn sqlite_store(dir: &TempDir) -> StoreClient {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.db_path = dir.path().join("envirogeo.db").to_string_lossy().into_owned();
    StoreClient::from_config(&config.store).expect("Failed to open store")
}

// =============================================================================
// Analysis Workflow
// =============================================================================

#[tokio::test]
async fn test_every_parameter_full_window() {
    let analyzer = Analyzer::default();
    for parameter in ParameterId::ALL {
        let result = analyzer
            .analyze(&lahore(parameter))
            .await
            .expect("Analysis failed");
        let def = parameter.definition();

        assert!(result.time_series.len() <= 91);
        for point in &result.time_series {
            assert!(point.value >= def.min && point.value <= def.max);
        }
        assert!(result.stats.min <= result.stats.mean && result.stats.mean <= result.stats.max);
        assert_eq!(
            result.stats.trend == Trend::Stable,
            result.stats.trend_percent.abs() < 2.0
        );
        assert!(result.insights[0].starts_with(def.name));
        assert!(result.insights.len() <= 3);
    }
}

#[tokio::test]
async fn test_save_history_and_delete_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);
    let analyzer = Analyzer::new(Some(NdviClient::mock()));

    let ndvi = analyzer.analyze(&lahore(ParameterId::Ndvi)).await.unwrap();
    let aqi = analyzer.analyze(&lahore(ParameterId::Aqi)).await.unwrap();

    let first = store
        .save_analysis(
            ANALYSIS_HISTORY,
            "user-1",
            to_document(&ndvi.to_new_analysis()).unwrap(),
        )
        .unwrap();
    let second = store
        .save_analysis(
            ANALYSIS_HISTORY,
            "user-1",
            to_document(&aqi.to_new_analysis()).unwrap(),
        )
        .unwrap();

    let history: Vec<AnalysisRecord> = store
        .get_analysis_history(ANALYSIS_HISTORY, "user-1")
        .unwrap()
        .into_iter()
        .map(|doc| serde_json::from_value(serde_json::Value::Object(doc)).unwrap())
        .collect();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second);
    assert_eq!(history[1].id, first);
    assert_eq!(history[1].parameter, ParameterId::Ndvi);
    assert_eq!(history[1].results.insights, ndvi.insights);
    assert_eq!(history[1].results.stats.trend, ndvi.stats.trend);
    assert_eq!(history[0].geometry_type, "point");
    assert!(history.iter().all(|r| r.user_id == "user-1"));

    // Another user cannot delete it
    assert_eq!(
        store.delete_analysis(ANALYSIS_HISTORY, "user-2", &first).unwrap(),
        0
    );
    assert_eq!(
        store.delete_analysis(ANALYSIS_HISTORY, "user-1", &first).unwrap(),
        1
    );
    assert_eq!(
        store
            .get_analysis_history(ANALYSIS_HISTORY, "user-1")
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_export_analysis_result() {
    let result = Analyzer::default()
        .analyze(&lahore(ParameterId::Rainfall))
        .await
        .unwrap();

    let csv = export::export(&result, ExportFormat::Csv).unwrap();
    assert_eq!(csv.file_name, "Rainfall_20190101_20241231.csv");
    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines[0], "Date,Value");
    assert_eq!(lines.len(), result.time_series.len() + 1);
    assert!(!csv.content.ends_with('\n'));

    let geo = export::export(&result, ExportFormat::GeoJson).unwrap();
    let value: serde_json::Value = serde_json::from_str(&geo.content).unwrap();
    assert_eq!(value["features"][0]["geometry"]["type"], "Point");
    assert_eq!(value["features"][0]["properties"]["parameter"], "Rainfall");
}

// =============================================================================
// Store Protocol
// =============================================================================

#[test]
fn test_profile_protocol_against_both_backends() {
    let dir = TempDir::new().unwrap();
    for store in [StoreClient::memory(), sqlite_store(&dir)] {
        let update = ProfileUpdate {
            email: Some("analyst@example.org".to_string()),
            full_name: Some("Field Analyst".to_string()),
            avatar_url: None,
        };
        let data = to_document(&update).unwrap();
        let first = store.upsert_profile(PROFILES, "u-9", &data).unwrap();
        let second = store.upsert_profile(PROFILES, "u-9", &data).unwrap();
        assert!(first.upserted_id.is_some());
        assert_eq!(second.modified_count, 1);

        let request: StoreRequest = serde_json::from_value(json!({
            "action": "getProfile",
            "collection": PROFILES,
            "userId": "u-9"
        }))
        .unwrap();
        let response = request.handle(&store);
        assert!(response.success, "{}", store.name());
        assert_eq!(response.data["fullName"], "Field Analyst");
        assert_eq!(response.data["_id"], json!(first.upserted_id.unwrap()));
    }
}
