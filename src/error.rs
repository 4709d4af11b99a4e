//! Error types for rozmitka.

use thiserror::Error;

/// Result type for rozmitka operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rozmitka operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A raw category code has no usable entry in the id2label table.
    ///
    /// This is a configuration defect, not an empty result: reconciliation
    /// aborts rather than guessing a label.
    #[error("Label lookup failed: {0}")]
    LabelLookup(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Span extraction failed.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a label lookup error.
    pub fn label_lookup(msg: impl Into<String>) -> Self {
        Error::LabelLookup(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Error::Extraction(msg.into())
    }
}
