//! Configuration for the database process.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `SIMPLEDB_` (a `.env` file in the
//! working directory is loaded first). Nested keys are not used, so
//! `SIMPLEDB_HTTP_PORT=9000` sets `http_port`.

use config::{Config, Environment, File, FileFormat};
use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use typed_builder::TypedBuilder;
use url::Url;

pub const DEFAULT_STORAGE_URI: &str = "memory://";
pub const DEFAULT_DATABASE: &str = "simpledb";
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_HISTORY_FILE: &str = ".simpledb_history";
pub const DEFAULT_LOG_FILTER: &str = "warn";

const ENV_PREFIX: &str = "SIMPLEDB";

#[derive(Debug, Error)]
pub enum DbConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] config::ConfigError),
    #[error("Invalid storage URI '{uri}': {reason}")]
    InvalidStorageUri { uri: String, reason: String },
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    CopyGetters,
    Setters,
    TypedBuilder,
)]
pub struct DbConfig {
    /// `memory://` for a purely in-process store, `file:///<dir>` to keep a
    /// JSON snapshot per database in `<dir>`.
    #[builder(default = DEFAULT_STORAGE_URI.to_string(), setter(into))]
    #[getset(get = "pub", set = "pub")]
    storage_uri: String,
    #[builder(default = DEFAULT_DATABASE.to_string(), setter(into))]
    #[getset(get = "pub", set = "pub")]
    database: String,
    #[builder(default = DEFAULT_HTTP_HOST.to_string(), setter(into))]
    #[getset(get = "pub", set = "pub")]
    http_host: String,
    #[builder(default = DEFAULT_HTTP_PORT)]
    #[getset(get_copy = "pub", set = "pub")]
    http_port: u16,
    #[builder(default = DEFAULT_HISTORY_FILE.to_string(), setter(into))]
    #[getset(get = "pub", set = "pub")]
    history_file: String,
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    #[builder(default = DEFAULT_LOG_FILTER.to_string(), setter(into))]
    #[getset(get = "pub", set = "pub")]
    log_filter: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::builder().build()
    }
}

/// Where the storage gateway keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageTarget {
    /// Nothing outlives the process.
    Memory,
    /// Snapshots are written to this directory.
    Directory(PathBuf),
}

impl StorageTarget {
    pub fn parse(uri: &str) -> Result<Self, DbConfigError> {
        let invalid = |reason: &str| DbConfigError::InvalidStorageUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
        match url.scheme() {
            "memory" => Ok(StorageTarget::Memory),
            "file" => url
                .to_file_path()
                .map(StorageTarget::Directory)
                .map_err(|_| invalid("not an absolute file path")),
            scheme => Err(invalid(&format!("unsupported scheme '{}'", scheme))),
        }
    }
}

impl DbConfig {
    /// Loads defaults, then `file` (if given, it must exist), then the
    /// environment.
    pub fn load(file: Option<&Path>) -> Result<Self, DbConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let mut builder = Config::builder()
            .set_default("storage_uri", DEFAULT_STORAGE_URI)?
            .set_default("database", DEFAULT_DATABASE)?
            .set_default("http_host", DEFAULT_HTTP_HOST)?
            .set_default("http_port", DEFAULT_HTTP_PORT as i64)?
            .set_default("history_file", DEFAULT_HISTORY_FILE)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?;

        if let Some(path) = file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize::<DbConfig>()?)
    }

    pub fn storage_target(&self) -> Result<StorageTarget, DbConfigError> {
        StorageTarget::parse(&self.storage_uri)
    }

    /// `host:port` for the HTTP endpoint.
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
