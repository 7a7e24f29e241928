use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures talking to the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures delivering a document to the search backend.
///
/// The scheduler does not distinguish between variants: every one of them
/// counts as a failed attempt for retry purposes.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("search client: invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("search client: {0} is required")]
    MissingField(&'static str),

    #[error("search client: request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search client: unexpected response code: {0}")]
    UnexpectedStatus(u16),

    #[error("search client: call timed out after {0:?}")]
    Timeout(Duration),

    #[error("search client: rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid logger format: {0} (expected: text|json)")]
    InvalidFormat(String),
    #[error("Logger has been already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logger: {0}")]
    InitializationFailed(String),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
