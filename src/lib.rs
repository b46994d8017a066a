//! Sumi-Scout: a patient contact finder
//!
//! This crate enriches a list of organization names with a verified public
//! website and a contact email address. Each name is resolved through a
//! registry lookup, then the website is crawled under strict time, depth and
//! failure-classification controls until the first valid email is found.

pub mod config;
pub mod crawler;
pub mod email;
pub mod input;
pub mod output;
pub mod registry;
pub mod runner;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scout operations
///
/// Per-URL network failures are never reported through this type; they are
/// classified into [`crawler::FetchOutcome`] values instead. Everything here is
/// fatal to the run.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Network connectivity lost: {consecutive} URLs in a row exhausted their retries")]
    ConnectivityLost { consecutive: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Input dataset errors
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input has no '{0}' column")]
    MissingColumn(String),
}

/// Result type alias for Sumi-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlController, FetchOutcome};
pub use email::{extract, EmailCandidate};
pub use input::Entity;
pub use runner::Runner;
pub use state::{CrawlState, RunStats};
pub use storage::{EntityResult, FoundStatus};
