//! fdio: a crawler for Flogo contributions published on GitHub
//!
//! This crate searches the GitHub code-search index for `activity.json` and
//! `trigger.json` metadata files, fetches and normalizes each match into a
//! [`CanonicalRecord`], and hands every page of results to a [`RecordSink`].
//! Paging stops early once the most recently indexed repository has been
//! idle for longer than a caller-chosen number of hours.

pub mod config;
pub mod crawler;
pub mod github;
pub mod model;
pub mod storage;

use thiserror::Error;

/// Main error type for fdio operations
#[derive(Debug, Error)]
pub enum FdioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed: {kind}")]
    Transport {
        url: String,
        kind: TransportErrorKind,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Malformed search response for page {page} ({url}): {message}")]
    EnvelopeParse {
        url: String,
        page: u32,
        message: String,
    },

    #[error("Could not find last update of {url}")]
    StalenessNotFound { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single outbound request failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportErrorKind {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for fdio operations
pub type Result<T> = std::result::Result<T, FdioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, ContributionType, CrawlReport, CrawlSettings, StopReason};
pub use model::{dedup_key, CanonicalRecord};
pub use storage::{MemorySink, RecordSink, SqliteStorage};
