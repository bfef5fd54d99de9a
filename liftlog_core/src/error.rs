//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Spreadsheet export error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected entry input (negative weight, blank exercise name, ...)
    #[error("Invalid entry: {0}")]
    Validation(String),

    /// No stored entry carries the requested id
    #[error("No entry with id {0}")]
    EntryNotFound(uuid::Uuid),

    /// Export target range contains no day groups
    #[error("No data for range {0}")]
    NoDataForRange(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
