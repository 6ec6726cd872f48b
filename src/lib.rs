//! yc-founders: a founder roster collector for YC company listings
//!
//! This crate fetches the public company listing, scrapes each company's
//! detail page for its founders, and exports one CSV row per founder. Fetches
//! are concurrent but rate limited, and transient failures are retried with
//! backoff.

pub mod collector;
pub mod config;
pub mod output;
pub mod records;
pub mod url;

use thiserror::Error;

/// Main error type for run-fatal failures
///
/// Per-company failures never surface here; they are reported through
/// [`records::FetchResult`] and summarized in the run report.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch company listing from {url}: {reason}")]
    Listing { url: String, reason: String },

    #[error("Insufficient data: requested {requested} companies, only {available} unique available")]
    InsufficientData { requested: usize, available: usize },

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Run interrupted")]
    Interrupted,
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

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while writing the CSV output
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{CompanyRecord, FetchResult, FounderRecord, OutputRow};
