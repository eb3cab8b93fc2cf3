//! Shared command utilities

use anyhow::{Context, Result};
use tracing::warn;

use envirogeo_core::{AppConfig, Analyzer, NdviClient, StoreBackend, StoreClient};

/// Open the configured document store
pub fn open_store(config: &AppConfig) -> Result<StoreClient> {
    if config.store.backend == StoreBackend::Memory {
        warn!("Using in-memory store; saved analyses are lost when the command exits");
    }
    StoreClient::from_config(&config.store).context("Failed to open document store")
}

/// Build an analyzer wired to the configured NDVI source, if any
pub fn build_analyzer(config: &AppConfig) -> Result<Analyzer> {
    let ndvi = NdviClient::from_config(&config.ndvi).context("Failed to configure NDVI source")?;
    Ok(Analyzer::new(ndvi))
}
