//! Configuration management for harvester
//!
//! Handles loading and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Default config file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "harvester.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backing store connection settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Download and ingestion pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Redis store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis host
    #[serde(default = "default_store_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Optional AUTH credential
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum idle connections kept in the pool
    #[serde(default = "default_store_max_idle")]
    pub max_idle: usize,

    /// Maximum active connections in the pool
    #[serde(default = "default_store_max_active")]
    pub max_active: usize,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory archives are downloaded into
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,

    /// Cap on simultaneous archive downloads
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,

    /// Listing page scanned when no URL is supplied
    #[serde(default = "default_page_url")]
    pub default_page_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_store_host(),
            port: default_store_port(),
            password: None,
            max_idle: default_store_max_idle(),
            max_active: default_store_max_active(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            download_root: PathBuf::from(default_download_root()),
            max_concurrent_downloads: default_max_concurrent_downloads(),
            default_page_url: default_page_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Redis connection URL for the pool.
    ///
    /// The credential goes through [`Url::set_password`], which
    /// percent-encodes characters like `@`, `/` and `:` that would otherwise
    /// corrupt the authority section.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("redis://{}:{}", self.host, self.port))?;
        if let Some(password) = &self.password {
            url.set_password(Some(password)).map_err(|_| {
                Error::Config(format!("Cannot attach credential to redis://{}", self.host))
            })?;
        }
        Ok(url)
    }
}

impl Config {
    /// Load configuration from a specific file path.
    ///
    /// A missing config file is fatal: the store address and pool sizing
    /// must come from somewhere explicit.
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_concurrent_downloads == 0 {
            return Err(Error::Config(
                "pipeline.max_concurrent_downloads must be at least 1".to_string(),
            ));
        }

        if self.store.max_active == 0 {
            return Err(Error::Config(
                "store.max_active must be at least 1".to_string(),
            ));
        }

        if self.store.max_idle > self.store.max_active {
            return Err(Error::Config(
                "store.max_idle must be <= store.max_active".to_string(),
            ));
        }

        if self.pipeline.timeout_secs == 0 {
            return Err(Error::Config(
                "pipeline.timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
