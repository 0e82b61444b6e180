//! Error types for the ingestion and mirror-sync pipeline.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or syncing.
#[derive(Error, Debug)]
pub enum Error {
    /// ClickHouse error.
    #[error("ClickHouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    /// HTTP transport error (insights API or sheet mirror).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Insights API rejected the request (auth, rate limit, bad account).
    #[error("insights source error: {0}")]
    Source(String),

    /// Sheets API returned a non-success response.
    #[error("sheets API error (status {status}): {body}")]
    Sheets { status: u16, body: String },

    /// The routed mirror tab does not exist in the spreadsheet.
    #[error("mirror tab '{tab}' not found")]
    MirrorNotFound { tab: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
