//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default ingest body limit, well above axum's 2 MB extractor default.
pub const DEFAULT_MAX_INGEST_BYTES: usize = 64 * 1024 * 1024;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file holding the `orders` table
    pub database_path: PathBuf,
    /// JSON item catalog loaded at startup
    pub catalog_path: PathBuf,
    /// SQL script creating the `orders` table
    pub schema_path: PathBuf,
    /// TTL in seconds for cached catalog responses, 0 = never expire
    pub catalog_cache_ttl: u64,
    /// Background cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Largest accepted `/marketorders.ingest` body in bytes
    pub max_ingest_bytes: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `DATABASE_PATH` - SQLite file (default: db.sqlite3)
    /// - `CATALOG_PATH` - Item catalog (default: data/items.json)
    /// - `SCHEMA_PATH` - Schema script (default: schema.sql)
    /// - `CATALOG_CACHE_TTL` - Catalog response TTL in seconds (default: 0)
    /// - `CLEANUP_INTERVAL` - Cache sweep frequency in seconds (default: 60)
    /// - `MAX_INGEST_BYTES` - Ingest body limit in bytes (default: 64 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: path_var("DATABASE_PATH").unwrap_or(defaults.database_path),
            catalog_path: path_var("CATALOG_PATH").unwrap_or(defaults.catalog_path),
            schema_path: path_var("SCHEMA_PATH").unwrap_or(defaults.schema_path),
            catalog_cache_ttl: parsed_var("CATALOG_CACHE_TTL")
                .unwrap_or(defaults.catalog_cache_ttl),
            cleanup_interval: parsed_var::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            max_ingest_bytes: parsed_var::<usize>("MAX_INGEST_BYTES")
                .filter(|bytes| *bytes > 0)
                .unwrap_or(defaults.max_ingest_bytes),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            database_path: PathBuf::from("db.sqlite3"),
            catalog_path: PathBuf::from("data/items.json"),
            schema_path: PathBuf::from("schema.sql"),
            catalog_cache_ttl: 0,
            cleanup_interval: 60,
            max_ingest_bytes: DEFAULT_MAX_INGEST_BYTES,
        }
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.catalog_cache_ttl, 0);
        assert_eq!(config.max_ingest_bytes, 64 * 1024 * 1024);
        assert_eq!(config.catalog_path, PathBuf::from("data/items.json"));
    }

    #[test]
    fn test_parsed_var_ignores_garbage() {
        env::set_var("MARKET_API_TEST_PORT", "not-a-port");
        assert_eq!(parsed_var::<u16>("MARKET_API_TEST_PORT"), None);
        env::set_var("MARKET_API_TEST_PORT", "8080");
        assert_eq!(parsed_var::<u16>("MARKET_API_TEST_PORT"), Some(8080));
        env::remove_var("MARKET_API_TEST_PORT");
    }
}
