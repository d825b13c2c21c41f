//! Error types for rust_powsim

use thiserror::Error;

/// Main error type for simulation runs
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid simulation setup, detected before any random draws
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("DE backend '{method}' failed: {reason}")]
    Backend { method: String, reason: String },

    #[error("Invalid parameter bundle: {reason}")]
    InvalidParameters { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Numerical instability in {operation}: {details}")]
    NumericalInstability { operation: String, details: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
