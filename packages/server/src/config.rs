//! Server configuration.
//!
//! Loaded from a TOML file with per-field defaults, so a missing file or
//! a sparse one both yield a runnable configuration. Only the geocoding
//! proxy needs explicit values (`geocode_api_uri`, `geocode_api_key`);
//! without them the `/api/location` endpoint answers 502.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors from loading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Full server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_address")]
    pub address: String,

    /// Directory where the Tantivy search index is stored.
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Path to the RBI branch CSV dump.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Path to the curated bank abbreviation list (JSON array).
    #[serde(default = "default_banks_list_path")]
    pub banks_list_path: PathBuf,

    /// Directory of static frontend files served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Number of records per ingestion batch commit.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of hits per search result page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Memory budget for the Tantivy index writer in bytes.
    #[serde(default = "default_writer_heap")]
    pub writer_heap_bytes: usize,

    /// Upstream reverse-geocoding API endpoint.
    #[serde(default)]
    pub geocode_api_uri: String,

    /// API key forwarded to the upstream geocoder.
    #[serde(default)]
    pub geocode_api_key: String,
}

fn default_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("search.index")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data.csv")
}

fn default_banks_list_path() -> PathBuf {
    PathBuf::from("banks.json")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

const fn default_batch_size() -> usize {
    100
}

const fn default_page_size() -> usize {
    10
}

const fn default_writer_heap() -> usize {
    256 * 1024 * 1024 // 256 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            index_dir: default_index_dir(),
            data_path: default_data_path(),
            banks_list_path: default_banks_list_path(),
            static_dir: default_static_dir(),
            batch_size: default_batch_size(),
            page_size: default_page_size(),
            writer_heap_bytes: default_writer_heap(),
            geocode_api_uri: String::new(),
            geocode_api_key: String::new(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a present but malformed file
    /// is an error (a half-read configuration is worse than none).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!(
                "Config file {} not found; using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Ok(toml::de::from_str(&raw)?)
    }
}
