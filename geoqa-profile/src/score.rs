//! Overall quality score.
//!
//! ```text
//! score = w_validity     · valid / total
//!       + w_completeness · (1 − nulls / cells)
//!       + w_crs          · [crs present]
//!       + w_non_empty    · (total − empty) / total
//! ```
//!
//! `total` is clamped to 1 so an empty dataset scores without dividing by
//! zero. The result is capped at 100.

use serde::{Deserialize, Serialize};

/// Score component weights. The defaults sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub validity: f64,
    pub completeness: f64,
    pub crs: f64,
    pub non_empty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            validity: 40.0,
            completeness: 30.0,
            crs: 15.0,
            non_empty: 15.0,
        }
    }
}

/// Inputs to [`quality_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub total_features: usize,
    pub valid_count: usize,
    pub empty_count: usize,
    /// Attribute completeness ratio in `[0, 1]`.
    pub completeness: f64,
    pub has_crs: bool,
}

/// Compute the 0–100 quality score.
pub fn quality_score(inputs: &ScoreInputs, weights: &ScoreWeights) -> f64 {
    let total = inputs.total_features.max(1) as f64;
    let mut score = 0.0;
    score += inputs.valid_count as f64 / total * weights.validity;
    score += inputs.completeness * weights.completeness;
    if inputs.has_crs {
        score += weights.crs;
    }
    score += (total - inputs.empty_count as f64) / total * weights.non_empty;
    score.min(100.0)
}

/// Round to one decimal place.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ScoreInputs {
        ScoreInputs {
            total_features: 10,
            valid_count: 10,
            empty_count: 0,
            completeness: 1.0,
            has_crs: true,
        }
    }

    #[test]
    fn test_perfect_score() {
        assert_eq!(quality_score(&inputs(), &ScoreWeights::default()), 100.0);
    }

    #[test]
    fn test_components() {
        let mut i = inputs();
        i.valid_count = 5;
        i.empty_count = 2;
        i.completeness = 0.5;
        i.has_crs = false;
        // 20 + 15 + 0 + 12
        let score = quality_score(&i, &ScoreWeights::default());
        assert!((score - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dataset() {
        let i = ScoreInputs {
            total_features: 0,
            valid_count: 0,
            empty_count: 0,
            completeness: 1.0,
            has_crs: false,
        };
        // No division by zero: 0 + 30 + 0 + 15
        assert_eq!(quality_score(&i, &ScoreWeights::default()), 45.0);
    }

    #[test]
    fn test_capped_at_100() {
        let weights = ScoreWeights {
            validity: 80.0,
            ..ScoreWeights::default()
        };
        assert_eq!(quality_score(&inputs(), &weights), 100.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(87.46), 87.5);
        assert_eq!(round_score(87.44), 87.4);
    }
}
