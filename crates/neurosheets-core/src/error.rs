//! Error types for NeuroSheets core.

use thiserror::Error;

/// Errors that can occur in the NeuroSheets application
#[derive(Error, Debug)]
pub enum NeuroSheetsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Sheet not found: {0}")]
    NotFound(String),

    #[error("CSV file is empty")]
    EmptyCsv,

    #[error("Unsupported export format: {0}")]
    UnsupportedExport(String),
}

pub type Result<T> = std::result::Result<T, NeuroSheetsError>;
