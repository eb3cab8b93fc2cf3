//! Error types for EnviroGeo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// User input rejected before any analysis was attempted
    #[error("{0}")]
    Validation(String),

    /// External data source failed or returned an error payload
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
