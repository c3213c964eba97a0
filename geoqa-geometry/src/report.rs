//! Aggregation of check results.
//!
//! The typed reports from each check are combined into [`GeometryReport`] and
//! [`QualityReport`]. [`QualityReport::to_record`] flattens them into a
//! [`CheckResult`], the flat key/value record handed to the scoring and
//! rendering layers.

use crate::config::CheckConfig;
use crate::dedup::{check_duplicates, DuplicateReport};
use crate::error::Result;
use crate::geometry::{FeatureIndex, GeometryStore};
use crate::repair;
use crate::topology::{TopologyChecker, TopologyReport};
use crate::validity::{
    check_empty, check_geometry_types, check_null, check_validity, EmptyReport, NullReport,
    TypeReport, ValidityReport,
};
use crate::vertices::{compute_complexity, ComplexityReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Record keys.
pub mod keys {
    pub const TOTAL_FEATURES: &str = "total_features";

    pub const VALID_COUNT: &str = "valid_count";
    pub const INVALID_COUNT: &str = "invalid_count";
    pub const INVALID_INDICES: &str = "invalid_indices";
    pub const INVALID_REASONS: &str = "invalid_reasons";
    pub const VALIDITY_FAULT_INDICES: &str = "validity_fault_indices";

    pub const EMPTY_COUNT: &str = "empty_count";
    pub const EMPTY_INDICES: &str = "empty_indices";
    pub const NULL_COUNT: &str = "null_count";
    pub const NULL_INDICES: &str = "null_indices";

    pub const DUPLICATE_COUNT: &str = "duplicate_count";
    pub const DUPLICATE_INDICES: &str = "duplicate_indices";

    pub const GEOMETRY_TYPES: &str = "geometry_types";
    pub const MIXED_TYPES: &str = "mixed_types";
    pub const GEOMETRY_TYPE: &str = "geometry_type";

    pub const AVG_VERTICES: &str = "avg_vertices";
    pub const MAX_VERTICES: &str = "max_vertices";
    pub const MIN_VERTICES: &str = "min_vertices";
    pub const TOTAL_VERTICES: &str = "total_vertices";

    pub const BAD_RING_COUNT: &str = "bad_ring_count";
    pub const BAD_RING_INDICES: &str = "bad_ring_indices";
    pub const EXCESSIVE_PRECISION_COUNT: &str = "excessive_precision_count";
    pub const EXCESSIVE_PRECISION_INDICES: &str = "excessive_precision_indices";
    pub const PRECISION_SAMPLE_COORDS: &str = "precision_sample_coords";
    pub const SLIVER_COUNT: &str = "sliver_count";
    pub const SLIVER_INDICES: &str = "sliver_indices";
    pub const OVERLAP_COUNT: &str = "overlap_count";
    pub const OVERLAP_PAIRS: &str = "overlap_pairs";
    pub const OVERLAP_SKIPPED: &str = "overlap_skipped";
}

/// One value in a [`CheckResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckValue {
    Count(usize),
    Signed(i64),
    Flag(bool),
    Ratio(f64),
    Text(String),
    Indices(Vec<FeatureIndex>),
    Pairs(Vec<(FeatureIndex, FeatureIndex)>),
    Reasons(Vec<(FeatureIndex, String)>),
    Histogram(BTreeMap<String, usize>),
    Coords(Vec<(FeatureIndex, f64, f64)>),
    /// Named measurements, e.g. `{"min": .., "max": .., "mean": ..}`.
    Measures(BTreeMap<String, f64>),
    /// Name → label, e.g. column → dtype.
    Labels(BTreeMap<String, String>),
}

impl CheckValue {
    pub fn as_count(&self) -> Option<usize> {
        match self {
            CheckValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i64> {
        match self {
            CheckValue::Signed(n) => Some(*n),
            CheckValue::Count(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CheckValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_ratio(&self) -> Option<f64> {
        match self {
            CheckValue::Ratio(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CheckValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_indices(&self) -> Option<&[FeatureIndex]> {
        match self {
            CheckValue::Indices(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&BTreeMap<String, usize>> {
        match self {
            CheckValue::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_measures(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            CheckValue::Measures(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            CheckValue::Labels(l) => Some(l),
            _ => None,
        }
    }
}

/// Flat check record keyed by the constants in [`keys`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CheckResult(BTreeMap<&'static str, CheckValue>);

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Every key is written by exactly one sub-report.
    pub fn insert(&mut self, key: &'static str, value: CheckValue) {
        let previous = self.0.insert(key, value);
        debug_assert!(previous.is_none(), "duplicate check key: {key}");
    }

    /// Merge another record into this one.
    pub fn extend(&mut self, other: CheckResult) {
        for (key, value) in other.0 {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&CheckValue> {
        self.0.get(key)
    }

    pub fn count(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(CheckValue::as_count)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Results of the feature-level geometry checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometryReport {
    pub total_features: usize,
    pub validity: ValidityReport,
    pub empty: EmptyReport,
    pub null: NullReport,
    pub duplicates: DuplicateReport,
    pub types: TypeReport,
    pub complexity: ComplexityReport,
}

impl GeometryReport {
    pub fn to_record(&self) -> CheckResult {
        use CheckValue::*;
        let mut r = CheckResult::new();
        r.insert(keys::TOTAL_FEATURES, Count(self.total_features));

        let v = &self.validity;
        r.insert(keys::VALID_COUNT, Count(v.valid_count));
        r.insert(keys::INVALID_COUNT, Count(v.invalid_count));
        r.insert(keys::INVALID_INDICES, Indices(v.invalid_indices.clone()));
        r.insert(keys::INVALID_REASONS, Reasons(v.invalid_reasons.clone()));
        r.insert(keys::VALIDITY_FAULT_INDICES, Indices(v.fault_indices.clone()));

        r.insert(keys::EMPTY_COUNT, Count(self.empty.empty_count));
        r.insert(keys::EMPTY_INDICES, Indices(self.empty.empty_indices.clone()));
        r.insert(keys::NULL_COUNT, Count(self.null.null_count));
        r.insert(keys::NULL_INDICES, Indices(self.null.null_indices.clone()));

        r.insert(keys::DUPLICATE_COUNT, Count(self.duplicates.duplicate_count));
        r.insert(
            keys::DUPLICATE_INDICES,
            Indices(self.duplicates.duplicate_indices.clone()),
        );

        r.insert(keys::GEOMETRY_TYPES, Histogram(self.types.geometry_types.clone()));
        r.insert(keys::MIXED_TYPES, Flag(self.types.mixed_types));
        r.insert(keys::GEOMETRY_TYPE, Text(self.types.dominant_name().to_string()));

        let c = &self.complexity;
        r.insert(keys::AVG_VERTICES, Ratio(c.avg_vertices));
        r.insert(keys::MAX_VERTICES, Count(c.max_vertices));
        r.insert(keys::MIN_VERTICES, Count(c.min_vertices));
        r.insert(keys::TOTAL_VERTICES, Count(c.total_vertices));
        r
    }
}

impl TopologyReport {
    pub fn to_record(&self) -> CheckResult {
        use CheckValue::*;
        let mut r = CheckResult::new();
        r.insert(keys::BAD_RING_COUNT, Count(self.rings.bad_ring_count));
        r.insert(keys::BAD_RING_INDICES, Indices(self.rings.bad_ring_indices.clone()));

        let p = &self.precision;
        r.insert(keys::EXCESSIVE_PRECISION_COUNT, Count(p.excessive_precision_count));
        r.insert(
            keys::EXCESSIVE_PRECISION_INDICES,
            Indices(p.excessive_precision_indices.clone()),
        );
        r.insert(keys::PRECISION_SAMPLE_COORDS, Coords(p.precision_sample_coords.clone()));

        r.insert(keys::SLIVER_COUNT, Count(self.slivers.sliver_count));
        r.insert(keys::SLIVER_INDICES, Indices(self.slivers.sliver_indices.clone()));

        r.insert(keys::OVERLAP_COUNT, Signed(self.overlaps.overlap_count));
        r.insert(keys::OVERLAP_PAIRS, Pairs(self.overlaps.overlap_pairs.clone()));
        r.insert(keys::OVERLAP_SKIPPED, Flag(self.overlaps.skipped));
        r
    }
}

/// Geometry and topology results for one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    pub geometry: GeometryReport,
    pub topology: TopologyReport,
}

impl QualityReport {
    /// Flatten both reports into one record.
    pub fn to_record(&self) -> CheckResult {
        let mut record = self.geometry.to_record();
        record.extend(self.topology.to_record());
        record
    }
}

/// Feature-level geometry checks over one store.
pub struct GeometryChecker<'a> {
    store: &'a GeometryStore,
}

impl<'a> GeometryChecker<'a> {
    pub fn new(store: &'a GeometryStore) -> Self {
        Self { store }
    }

    /// Run every feature-level check.
    pub fn check_all(&self) -> GeometryReport {
        GeometryReport {
            total_features: self.store.len(),
            validity: self.check_validity(),
            empty: self.check_empty(),
            null: self.check_null(),
            duplicates: self.check_duplicates(),
            types: self.check_geometry_types(),
            complexity: self.compute_complexity(),
        }
    }

    pub fn check_validity(&self) -> ValidityReport {
        check_validity(self.store)
    }

    pub fn check_empty(&self) -> EmptyReport {
        check_empty(self.store)
    }

    pub fn check_null(&self) -> NullReport {
        check_null(self.store)
    }

    pub fn check_duplicates(&self) -> DuplicateReport {
        check_duplicates(self.store)
    }

    pub fn check_geometry_types(&self) -> TypeReport {
        check_geometry_types(self.store)
    }

    pub fn compute_complexity(&self) -> ComplexityReport {
        compute_complexity(self.store)
    }

    /// Repaired copy of the store. The checked store is not modified.
    pub fn fix_invalid(&self) -> GeometryStore {
        repair::fix_invalid(self.store)
    }
}

/// Run every geometry and topology check over a store.
pub fn assess(store: &GeometryStore, config: &CheckConfig) -> Result<QualityReport> {
    config.validate()?;
    let span = tracing::debug_span!("assess", features = store.len());
    let _guard = span.enter();

    let geometry = GeometryChecker::new(store).check_all();
    let topology = TopologyChecker::new(store, config).check_all();
    tracing::debug!(
        invalid = geometry.validity.invalid_count,
        duplicates = geometry.duplicates.duplicate_count,
        overlaps = topology.overlaps.overlap_count,
        "Quality assessment complete"
    );
    Ok(QualityReport { geometry, topology })
}
