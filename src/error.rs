//! Error types for extraction, fetching, discovery and persistence

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure while building a schema or extracting one listing
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("required field `{column}` not found")]
    MissingField { column: String },
}

/// Page-level failure: the URL is skipped and the run continues
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("TLS failure for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure inside a headless browser session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser command failed: {0}")]
    Browser(String),

    #[error("browser command timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure talking to the search provider
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Request(err.to_string())
    }
}

/// Failure reading the input table or writing the output table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column `{column}` not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },
}
