//! Lianjia-Scout: a paced second-hand listing crawler
//!
//! This crate crawls Lianjia search-result pages for one city, extracts a flat
//! record per listing, optionally enriches each record from its detail page,
//! and persists the results as GBK-safe CSV and UTF-8 JSON.

pub mod config;
pub mod crawler;
pub mod output;
pub mod parser;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Lianjia-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("No listing structure found on {url}")]
    EmptyPage { url: String },

    #[error("Invalid page state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and startup-input errors
///
/// Any of these aborts a run before the first network request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Required file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No city code known for '{0}'")]
    UnknownCity(String),

    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),
}

/// Errors produced by the fetcher once all attempts are spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Blocked by anti-bot verification at {url}")]
    Blocked { url: String },

    #[error("Failed to fetch {url} after {attempts} attempts (last status: {last_status:?})")]
    Exhausted {
        url: String,
        attempts: u32,
        last_status: Option<u16>,
    },
}

/// Result type alias for Lianjia-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use parser::{parse_detail, parse_listings, DetailRecord, ListingRecord};
pub use state::{DetailStatus, PageState};
