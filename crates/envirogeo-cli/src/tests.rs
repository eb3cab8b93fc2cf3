//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use clap::Parser;
use envirogeo_core::{
    models::ParameterId, AppConfig, AreaSelection, CoordinateInput, ExportFormat, StoreBackend,
    StoreClient,
};
use tempfile::TempDir;

use crate::cli::{AnalyzeArgs, Cli, Commands};
use crate::commands;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lahore_args(parameter: &str) -> AnalyzeArgs {
    AnalyzeArgs {
        parameter: parameter.to_string(),
        lat: Some(31.5204),
        lon: Some(74.3587),
        bbox: None,
        from: date(2022, 1, 1),
        to: date(2022, 12, 31),
        export: None,
        out: ".".into(),
        save_as: None,
    }
}

fn sqlite_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.db_path = dir.path().join("cli.db").to_string_lossy().into_owned();
    config
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_analyze_command() {
    let cli = Cli::try_parse_from([
        "envirogeo",
        "analyze",
        "--parameter",
        "Soil Moisture",
        "--lat",
        "30.1",
        "--lon",
        "71.4",
        "--from",
        "2020-01-01",
        "--to",
        "2020-12-31",
        "--export",
        "geojson",
    ])
    .unwrap();

    let Commands::Analyze(args) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.parameter, "Soil Moisture");
    assert_eq!(args.lat, Some(30.1));
    assert_eq!(args.from, date(2020, 1, 1));
    assert_eq!(args.export.as_deref(), Some("geojson"));
    assert!(!cli.verbose);
}

#[test]
fn test_bbox_conflicts_with_point() {
    let result = Cli::try_parse_from([
        "envirogeo",
        "analyze",
        "--parameter",
        "CO",
        "--lat",
        "30",
        "--bbox",
        "32,30,74,72",
        "--from",
        "2020-01-01",
        "--to",
        "2020-12-31",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_date_rejected_by_parser() {
    let result = Cli::try_parse_from([
        "envirogeo",
        "analyze",
        "--parameter",
        "CO",
        "--from",
        "2020-13-01",
        "--to",
        "2020-12-31",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "envirogeo",
        "history",
        "--user",
        "u-1",
        "--verbose",
        "--config",
        "/tmp/envirogeo.toml",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap().to_string_lossy(), "/tmp/envirogeo.toml");
}

// ========== Area Parsing Tests ==========

#[test]
fn test_parse_bbox() {
    let area = commands::parse_bbox("32.5, 30, 74.1,72").unwrap();
    assert_eq!(
        area,
        AreaSelection::BoundingBox {
            north: CoordinateInput::Number(32.5),
            south: CoordinateInput::Number(30.0),
            east: CoordinateInput::Number(74.1),
            west: CoordinateInput::Number(72.0),
        }
    );
}

#[test]
fn test_parse_bbox_rejects_bad_input() {
    assert!(commands::parse_bbox("32,30,74").is_err());
    assert!(commands::parse_bbox("32,30,74,72,1").is_err());
    assert!(commands::parse_bbox("north,30,74,72").is_err());
}

#[test]
fn test_parse_area_prefers_bbox() {
    let area = commands::parse_area(Some(1.0), None, Some("32,30,74,72")).unwrap();
    assert!(matches!(area, AreaSelection::BoundingBox { .. }));

    let area = commands::parse_area(None, None, None).unwrap();
    assert!(area.resolve().is_err());
}

// ========== Analyze Command Tests ==========

#[tokio::test]
async fn test_run_analysis_point() {
    let analyzer = envirogeo_core::Analyzer::default();
    let result = commands::run_analysis(&analyzer, &lahore_args("soil_moisture"))
        .await
        .unwrap();
    assert_eq!(result.parameter.id, ParameterId::SoilMoisture);
    assert_eq!(result.geometry_type.as_deref(), Some("point"));
}

#[tokio::test]
async fn test_run_analysis_errors() {
    let analyzer = envirogeo_core::Analyzer::default();

    let err = commands::run_analysis(&analyzer, &lahore_args("Ozone"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown parameter: Ozone");
    assert!(matches!(
        err.downcast_ref::<envirogeo_core::Error>(),
        Some(envirogeo_core::Error::UnknownParameter(_))
    ));

    let mut missing = lahore_args("NDVI");
    missing.lon = None;
    let err = commands::run_analysis(&analyzer, &missing).await.unwrap_err();
    assert!(err.to_string().starts_with("No area selected"));
}

#[tokio::test]
async fn test_write_export_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports");
    let analyzer = envirogeo_core::Analyzer::default();
    let result = commands::run_analysis(&analyzer, &lahore_args("LST"))
        .await
        .unwrap();

    let csv_path = commands::write_export(&result, ExportFormat::Csv, &out).unwrap();
    assert_eq!(csv_path, out.join("LST_20220101_20221231.csv"));
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert!(content.starts_with("Date,Value\n"));

    let geo_path = commands::write_export(&result, ExportFormat::GeoJson, &out).unwrap();
    assert_eq!(geo_path.extension().unwrap(), "geojson");

    assert!(commands::write_export(&result, ExportFormat::Shapefile, &out).is_err());
}

#[tokio::test]
async fn test_cmd_analyze_exports_and_saves() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);
    let mut args = lahore_args("Rainfall");
    args.export = Some("csv".to_string());
    args.out = dir.path().to_path_buf();
    args.save_as = Some("analyst".to_string());

    commands::cmd_analyze(&config, &args).await.unwrap();

    assert!(dir.path().join("Rainfall_20220101_20221231.csv").exists());
    let store = commands::open_store(&config).unwrap();
    let history = commands::load_history(&store, "analyst").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].parameter, ParameterId::Rainfall);
}

#[tokio::test]
async fn test_cmd_analyze_rejects_unknown_export_format() {
    let dir = TempDir::new().unwrap();
    let mut args = lahore_args("ET");
    args.export = Some("kml".to_string());
    args.out = dir.path().to_path_buf();

    let err = commands::cmd_analyze(&AppConfig::default(), &args)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unsupported export format"));
}

#[tokio::test]
async fn test_build_analyzer_with_mock_ndvi() {
    let mut config = AppConfig::default();
    config.ndvi.url = Some("mock".to_string());
    let analyzer = commands::build_analyzer(&config).unwrap();

    let result = commands::run_analysis(&analyzer, &lahore_args("NDVI"))
        .await
        .unwrap();
    assert_eq!(result.source.as_deref(), Some("Mock NDVI"));
}

// ========== History Command Tests ==========

#[tokio::test]
async fn test_history_list_and_delete() {
    let store = StoreClient::memory();
    let analyzer = envirogeo_core::Analyzer::default();
    let result = commands::run_analysis(&analyzer, &lahore_args("EVI"))
        .await
        .unwrap();

    let id = commands::save_to_history(&store, "u-1", &result).unwrap();
    assert!(commands::cmd_history_list(&store, "u-1").is_ok());
    assert!(commands::cmd_history_list(&store, "nobody").is_ok());

    // Wrong owner cannot delete
    assert!(commands::cmd_history_delete(&store, "u-2", &id).is_err());
    assert!(commands::cmd_history_delete(&store, "u-1", &id).is_ok());
    assert!(commands::load_history(&store, "u-1").unwrap().is_empty());
    assert!(commands::cmd_history_delete(&store, "u-1", &id).is_err());
}

#[test]
fn test_load_history_skips_malformed_entries() {
    use envirogeo_core::{store::ANALYSIS_HISTORY, DocumentStore};

    let store = StoreClient::memory();
    let mut doc = serde_json::Map::new();
    doc.insert("note".to_string(), serde_json::json!("not an analysis"));
    store.save_analysis(ANALYSIS_HISTORY, "u-1", doc).unwrap();

    assert!(commands::load_history(&store, "u-1").unwrap().is_empty());
}

#[test]
fn test_cmd_parameters() {
    assert!(commands::cmd_parameters().is_ok());
}
