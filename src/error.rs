use thiserror::Error;

/// Errors raised by the signal pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Input data that makes a derived value undefined (non-positive market cap, unordered dates)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough raw records to clear every warm-up period
    #[error("Insufficient data: need at least {required} records, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Nothing left to compute on
    #[error("Empty result: {0}")]
    EmptyResult(String),
}

/// Errors raised by record sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// No stored table for this code (security not listed or never collected)
    #[error("No data stored for {0}")]
    NotListed(String),

    /// A table exists but cannot be read as daily records
    #[error("Stored data for {code} is corrupt: {reason}")]
    Corrupt { code: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SignalError>;
