//! Error types for dataset profiling.

use geoqa_geometry::QualityError;
use std::path::PathBuf;
use thiserror::Error;

/// Profiling errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Input could not be read as a dataset.
    #[error("Invalid dataset {path}: {message}")]
    Format { path: String, message: String },

    /// Requested attribute column does not exist.
    #[error("Column '{name}' not found. Available: [{available}]")]
    ColumnNotFound { name: String, available: String },

    /// Engine error (bad WKT, reused feature id, bad configuration).
    #[error(transparent)]
    Quality(#[from] QualityError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for profiling operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
