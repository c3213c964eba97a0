//! Error types for the geometry quality engine.
//!
//! Two layers:
//! - [`QualityError`]: genuinely invalid invocations (unknown feature, reused
//!   index, unparseable WKT, bad configuration). Returned to the caller.
//! - [`Fault`]: a single geometry's predicate could not be evaluated. Faults are
//!   recorded per feature and never abort a scan.

use crate::geometry::FeatureIndex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

/// Engine errors.
#[derive(Error, Debug)]
pub enum QualityError {
    /// WKT parsing error.
    #[error("WKT parse error for feature {index}: {message}")]
    WktParse { index: FeatureIndex, message: String },

    /// Requested feature does not exist in the store.
    #[error("Feature not found: {0}")]
    FeatureNotFound(FeatureIndex),

    /// A feature index was reused within one store.
    #[error("Duplicate feature index: {0}")]
    DuplicateIndex(FeatureIndex),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Result record serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Per-feature fault raised while evaluating a geometric predicate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    /// The underlying geometry algorithm panicked.
    #[error("geometry predicate panicked: {0}")]
    Panicked(String),

    /// Coordinate is NaN or infinite and cannot be encoded canonically.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

/// Run a geometric predicate, converting a panic into a [`Fault`].
///
/// The geometry algorithms we delegate to may panic on pathological input
/// (e.g. robustness failures in boolean overlay). A panic is contained to the
/// feature being evaluated.
pub fn guard<T>(f: impl FnOnce() -> T) -> std::result::Result<T, Fault> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Fault::Panicked(message)
    })
}
