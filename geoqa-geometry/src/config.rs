//! Check configuration.
//!
//! All thresholds the checks use live in one immutable value that is passed
//! into the checkers. Every field has a default, so a partial TOML/JSON table
//! deserializes cleanly.

use crate::error::{QualityError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and limits for the geometry and topology checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Feature-count ceiling for the pairwise overlap scan.
    /// Above this the scan is skipped and reported with a sentinel.
    /// Default: 10,000
    pub max_features: usize,

    /// Maximum reasonable number of decimal places per coordinate axis.
    /// Default: 8
    pub max_decimals: usize,

    /// Coordinates sampled per geometry for the precision check.
    /// Default: 3
    pub precision_sample_size: usize,

    /// Number of flagged `(index, x, y)` examples kept for diagnostics.
    /// Default: 5
    pub precision_examples: usize,

    /// Polsby-Popper compactness below which a polygon is a sliver.
    /// Default: 0.01
    pub sliver_threshold: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            max_decimals: 8,
            precision_sample_size: 3,
            precision_examples: 5,
            sliver_threshold: 0.01,
        }
    }
}

impl CheckConfig {
    /// Set the overlap-scan feature ceiling.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the coordinate precision threshold.
    pub fn with_max_decimals(mut self, max_decimals: usize) -> Self {
        self.max_decimals = max_decimals;
        self
    }

    /// Set the sliver compactness threshold.
    pub fn with_sliver_threshold(mut self, threshold: f64) -> Self {
        self.sliver_threshold = threshold;
        self
    }

    /// Check that the thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.sliver_threshold > 0.0 && self.sliver_threshold <= 1.0) {
            return Err(QualityError::Config(format!(
                "sliver_threshold must be in (0, 1], got {}",
                self.sliver_threshold
            )));
        }
        if self.precision_sample_size == 0 {
            return Err(QualityError::Config(
                "precision_sample_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
