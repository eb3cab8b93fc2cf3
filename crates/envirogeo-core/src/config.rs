//! Application configuration
//!
//! Loaded from `config.toml` under the platform data directory (or an
//! explicit path), falling back to built-in defaults, then overridden by
//! environment variables:
//!
//! - `ENVIROGEO_STORE`: store backend, `memory` or `sqlite`
//! - `ENVIROGEO_DB`: SQLite file path
//! - `ENVIROGEO_DB_KEY`: passphrase for store encryption
//! - `ENVIROGEO_NDVI_URL`: base URL of the NDVI service (`mock` for built-in data)
//! - `ENVIROGEO_API_KEYS`: comma-separated bearer keys for the server
//!
//! ```toml
//! [store]
//! backend = "sqlite"
//! path = "/var/lib/envirogeo/envirogeo.db"
//!
//! [ndvi]
//! url = "https://ndvi.example.org"
//! timeout_secs = 30
//!
//! [server]
//! api_keys = ["change-me"]
//! allowed_origins = ["https://app.example.org"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const STORE_ENV: &str = "ENVIROGEO_STORE";
pub const DB_PATH_ENV: &str = "ENVIROGEO_DB";
pub const DB_KEY_ENV: &str = "ENVIROGEO_DB_KEY";
pub const NDVI_URL_ENV: &str = "ENVIROGEO_NDVI_URL";
pub const API_KEYS_ENV: &str = "ENVIROGEO_API_KEYS";

const DEFAULT_DB_PATH: &str = "envirogeo.db";
const DEFAULT_NDVI_TIMEOUT_SECS: u64 = 30;

/// Which document store backend to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown store backend '{}', expected memory or sqlite",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub db_path: String,
    /// Encryption passphrase; only read from the environment
    pub db_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            db_path: DEFAULT_DB_PATH.to_string(),
            db_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NdviConfig {
    /// Service base URL; NDVI analyses use synthetic data when unset
    pub url: Option<String>,
    pub timeout: Duration,
}

impl Default for NdviConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(DEFAULT_NDVI_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    /// Bearer keys accepted by the API; empty disables the check
    pub api_keys: Vec<String>,
    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub ndvi: NdviConfig,
    pub server: ServerSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    store: Option<RawStore>,
    ndvi: Option<RawNdvi>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawStore {
    backend: Option<StoreBackend>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNdvi {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    api_keys: Option<Vec<String>>,
    allowed_origins: Option<Vec<String>>,
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("envirogeo").join("config.toml"))
}

impl AppConfig {
    /// Load from `path` (or the default location) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.map(Path::to_path_buf).or_else(default_config_path);

        let mut config = match file {
            Some(ref p) if p.exists() => {
                let content = fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?;
                Self::parse(&content)?
            }
            _ => Self::default(),
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse TOML content over the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(store) = raw.store {
            if let Some(backend) = store.backend {
                config.store.backend = backend;
            }
            if let Some(path) = store.path {
                config.store.db_path = path;
            }
        }

        if let Some(ndvi) = raw.ndvi {
            config.ndvi.url = ndvi.url.filter(|u| !u.trim().is_empty());
            if let Some(secs) = ndvi.timeout_secs {
                config.ndvi.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(server) = raw.server {
            config.server.api_keys = server.api_keys.unwrap_or_default();
            config.server.allowed_origins = server.allowed_origins.unwrap_or_default();
        }

        Ok(config)
    }

    /// Override fields from variables resolved by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup(STORE_ENV) {
            self.store.backend = backend.parse()?;
        }
        if let Some(path) = lookup(DB_PATH_ENV) {
            self.store.db_path = path;
        }
        if let Some(key) = lookup(DB_KEY_ENV) {
            self.store.db_key = Some(key);
        }
        if let Some(url) = lookup(NDVI_URL_ENV) {
            self.ndvi.url = Some(url);
        }
        if let Some(keys) = lookup(API_KEYS_ENV) {
            self.server.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.db_path, "envirogeo.db");
        assert!(config.ndvi.url.is_none());
        assert_eq!(config.ndvi.timeout, Duration::from_secs(30));
        assert!(config.server.api_keys.is_empty());
    }

    #[test]
    fn test_parse_file() {
        let config = AppConfig::parse(
            r#"
            [store]
            backend = "sqlite"
            path = "/tmp/geo.db"

            [ndvi]
            url = "http://localhost:9000"
            timeout_secs = 5

            [server]
            api_keys = ["k1"]
            allowed_origins = ["http://localhost:5173"]
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.db_path, "/tmp/geo.db");
        assert_eq!(config.ndvi.url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.ndvi.timeout, Duration::from_secs(5));
        assert_eq!(config.server.api_keys, vec!["k1"]);
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::parse("[ndvi]\nurl = \"\"\n").unwrap();
        assert!(config.ndvi.url.is_none());
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(AppConfig::parse("[store"), Err(Error::Config(_))));
        assert!(AppConfig::parse("[store]\nbackend = \"mongo\"\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (STORE_ENV, "SQLite"),
            (DB_PATH_ENV, "/data/geo.db"),
            (DB_KEY_ENV, "secret"),
            (NDVI_URL_ENV, "mock"),
            (API_KEYS_ENV, " a, b ,,c "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.db_path, "/data/geo.db");
        assert_eq!(config.store.db_key.as_deref(), Some("secret"));
        assert_eq!(config.ndvi.url.as_deref(), Some("mock"));
        assert_eq!(config.server.api_keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_bad_backend_env() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|name| (name == STORE_ENV).then(|| "redis".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn test_load_missing_explicit_path_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(!config.store.db_path.is_empty());
    }
}
