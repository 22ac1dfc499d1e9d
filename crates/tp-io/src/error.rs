//! Error types for tp-io.

use thiserror::Error;

/// Errors raised while reading input layers or writing results.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `row` is the 1-based data row (header excluded).
    #[error("row {row}: invalid geometry: {message}")]
    Wkt { row: usize, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
