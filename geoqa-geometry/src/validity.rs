//! Validity and shape classification.
//!
//! Every feature lands in exactly one [`Classification`]: Null, Empty, Valid or
//! Invalid. OGC validity is delegated to [`geo::Validation`]; the reason string
//! is the `Display` of the first validation error.
//!
//! # Fault policy
//!
//! Classification returns `Result<Classification, Fault>`:
//! - a fault in the *reason* step keeps the feature Invalid with no reason;
//! - a fault in the *primary* predicate excludes the feature from both the
//!   valid and invalid tallies and lists it in `fault_indices`.

use crate::error::{guard, Fault};
use crate::geometry::{ensure_finite, is_empty, Feature, FeatureIndex, GeometryKind, GeometryStore};
use geo::Validation;
use geo_types::Geometry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Histogram bucket for Null geometries.
pub const NULL_TYPE_BUCKET: &str = "None";

/// Dominant type name when no non-null geometry exists.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Outcome of classifying one feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Null,
    Empty,
    Valid,
    Invalid { reason: Option<String> },
}

/// Evaluate the OGC validity predicate for one geometry.
///
/// Non-finite coordinates fault up front; geo's predicates assume finite input.
pub fn is_valid_geometry(geom: &Geometry<f64>) -> Result<bool, Fault> {
    ensure_finite(geom)?;
    guard(|| geom.is_valid())
}

/// Classify one feature.
pub fn classify(feature: &Feature) -> Result<Classification, Fault> {
    let Some(geom) = feature.geometry.as_ref() else {
        return Ok(Classification::Null);
    };
    if is_empty(geom) {
        return Ok(Classification::Empty);
    }
    if is_valid_geometry(geom)? {
        return Ok(Classification::Valid);
    }

    let reason = match guard(|| geom.check_validation()) {
        Ok(Err(err)) => Some(err.to_string()),
        Ok(Ok(())) => None,
        Err(fault) => {
            tracing::debug!(
                index = feature.index,
                error = %fault,
                "Validity reason extraction faulted"
            );
            None
        }
    };
    Ok(Classification::Invalid { reason })
}

/// Result of the validity check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidityReport {
    /// `total_features - invalid_count - fault_indices.len()`.
    pub valid_count: usize,
    pub invalid_count: usize,
    pub invalid_indices: Vec<FeatureIndex>,
    pub invalid_reasons: Vec<(FeatureIndex, String)>,
    /// Features whose validity predicate itself faulted.
    pub fault_indices: Vec<FeatureIndex>,
}

/// Result of the empty-geometry check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmptyReport {
    pub empty_count: usize,
    pub empty_indices: Vec<FeatureIndex>,
}

/// Result of the null-geometry check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NullReport {
    pub null_count: usize,
    pub null_indices: Vec<FeatureIndex>,
}

/// Geometry-type histogram and homogeneity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeReport {
    /// Type name → count, with a `"None"` bucket for Null geometries.
    pub geometry_types: BTreeMap<String, usize>,

    /// More than one non-null type present.
    pub mixed_types: bool,

    /// Most frequent non-null type. Ties go to the lexicographically
    /// smallest type name.
    pub dominant_type: Option<GeometryKind>,
}

impl TypeReport {
    /// Dominant type name, `"Unknown"` when the store has no non-null geometry.
    pub fn dominant_name(&self) -> &'static str {
        self.dominant_type
            .map(|k| k.name())
            .unwrap_or(UNKNOWN_TYPE)
    }
}

/// Check OGC validity of every non-null, non-empty geometry.
pub fn check_validity(store: &GeometryStore) -> ValidityReport {
    let mut report = ValidityReport::default();

    for feature in store.iter() {
        match classify(feature) {
            Ok(Classification::Invalid { reason }) => {
                report.invalid_indices.push(feature.index);
                if let Some(reason) = reason {
                    report.invalid_reasons.push((feature.index, reason));
                }
            }
            Ok(_) => {}
            Err(fault) => {
                tracing::debug!(
                    index = feature.index,
                    error = %fault,
                    "Validity predicate faulted; feature excluded from tallies"
                );
                report.fault_indices.push(feature.index);
            }
        }
    }

    report.invalid_count = report.invalid_indices.len();
    report.valid_count = store
        .len()
        .saturating_sub(report.invalid_count + report.fault_indices.len());
    report
}

/// Find geometries that are present but have no coordinates.
pub fn check_empty(store: &GeometryStore) -> EmptyReport {
    let empty_indices: Vec<FeatureIndex> = store
        .iter()
        .filter(|f| f.is_empty())
        .map(|f| f.index)
        .collect();
    EmptyReport {
        empty_count: empty_indices.len(),
        empty_indices,
    }
}

/// Find absent geometry slots.
pub fn check_null(store: &GeometryStore) -> NullReport {
    let null_indices: Vec<FeatureIndex> = store
        .iter()
        .filter(|f| f.is_null())
        .map(|f| f.index)
        .collect();
    NullReport {
        null_count: null_indices.len(),
        null_indices,
    }
}

/// Build the geometry-type histogram.
pub fn check_geometry_types(store: &GeometryStore) -> TypeReport {
    let mut geometry_types: BTreeMap<String, usize> = BTreeMap::new();
    for feature in store.iter() {
        let name = feature.kind().map(|k| k.name()).unwrap_or(NULL_TYPE_BUCKET);
        *geometry_types.entry(name.to_string()).or_insert(0) += 1;
    }

    let mut real_types = 0;
    let mut dominant: Option<(&str, usize)> = None;
    for (name, &count) in &geometry_types {
        if name == NULL_TYPE_BUCKET {
            continue;
        }
        real_types += 1;
        // Strict comparison: on a tie the earlier (smaller) name is kept.
        if dominant.map_or(true, |(_, best)| count > best) {
            dominant = Some((name.as_str(), count));
        }
    }

    TypeReport {
        mixed_types: real_types > 1,
        dominant_type: dominant.and_then(|(name, _)| GeometryKind::from_name(name)),
        geometry_types,
    }
}
