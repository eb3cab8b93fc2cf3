//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use envirogeo_core::{AppConfig, StoreBackend};
use envirogeo_server::ServerConfig;

use super::{build_analyzer, open_store};

pub async fn cmd_serve(
    config: &AppConfig,
    host: &str,
    port: u16,
    no_auth: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting EnviroGeo web server...");
    match config.store.backend {
        StoreBackend::Memory => println!("   Store: in-memory (not persisted)"),
        StoreBackend::Sqlite => println!("   Store: {}", config.store.db_path),
    }
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    match config.ndvi.url.as_deref() {
        Some(url) => println!("   NDVI source: {}", url),
        None => println!("   NDVI source: none (synthetic NDVI)"),
    }

    let server_config = ServerConfig {
        require_auth: !no_auth,
        ..ServerConfig::from(&config.server)
    };

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if server_config.api_keys.is_empty() {
        println!("   ⚠️  No API keys configured (ENVIROGEO_API_KEYS) - API is open");
    } else {
        println!(
            "   🔑 API keys: {} configured",
            server_config.api_keys.len()
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let store = open_store(config)?;
    let analyzer = build_analyzer(config)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    envirogeo_server::serve(store, analyzer, host, port, static_dir_str, server_config).await?;

    Ok(())
}
