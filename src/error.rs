//! Custom error types for harvester

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Archive error: {0}")]
    ArchiveFormat(String),

    #[error("Record format error: {0}")]
    RecordFormat(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for harvester
pub type Result<T> = std::result::Result<T, Error>;

/// XML deserialization failures are record format errors
impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Error::RecordFormat(err.to_string())
    }
}

/// Convert zip errors
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ArchiveFormat(err.to_string())
    }
}

/// Convert redis command errors
impl From<deadpool_redis::redis::RedisError> for Error {
    fn from(err: deadpool_redis::redis::RedisError) -> Self {
        Error::Store(err.to_string())
    }
}

/// Convert pool checkout errors
impl From<deadpool_redis::PoolError> for Error {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Error::Store(err.to_string())
    }
}
