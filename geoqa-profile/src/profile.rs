//! Dataset profile: runs every check once and keeps the results.

use crate::attributes::{profile_attributes, AttributeReport};
use crate::checks::{quality_checks, QualityCheck};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::score::{quality_score, round_score, ScoreInputs, ScoreWeights};
use crate::spatial::{analyze, geometry_stats, GeometryStats, SpatialReport};
use geoqa_geometry::{assess, BBox, CheckConfig, CheckResult, CheckValue, Crs, QualityReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Record keys added on top of the engine record.
pub mod keys {
    pub const DATASET_NAME: &str = "dataset_name";
    pub const COLUMN_COUNT: &str = "column_count";
    pub const TOTAL_NULLS: &str = "total_nulls";
    pub const COMPLETENESS: &str = "completeness";
    pub const CRS: &str = "crs";
    pub const QUALITY_SCORE: &str = "quality_score";
    pub const CRS_UNITS: &str = "crs_units";
    pub const CRS_IS_GEOGRAPHIC: &str = "crs_is_geographic";
    pub const CRS_IS_PROJECTED: &str = "crs_is_projected";
    pub const CENTER_X: &str = "center_x";
    pub const CENTER_Y: &str = "center_y";
    pub const AREA_STATS: &str = "area_stats";
    pub const PERIMETER_STATS: &str = "perimeter_stats";
    pub const LENGTH_STATS: &str = "length_stats";
    pub const COLUMN_DTYPES: &str = "column_dtypes";
}

/// Headline geometry counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryCounts {
    pub valid: usize,
    pub invalid: usize,
    pub empty: usize,
    pub duplicates: usize,
}

/// Concise dataset summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub name: String,
    pub source: String,
    pub features: usize,
    pub columns: usize,
    pub geometry_type: String,
    pub crs: Option<String>,
    pub bounds: Option<BBox>,
    /// Rounded to one decimal place.
    pub quality_score: f64,
    pub geometry_checks: GeometryCounts,
    pub attribute_completeness: BTreeMap<String, f64>,
    pub column_dtypes: BTreeMap<String, String>,
    pub spatial: SpatialReport,
}

/// Quality profile of one dataset.
#[derive(Debug, Clone)]
pub struct Profile {
    dataset: Dataset,
    config: CheckConfig,
    weights: ScoreWeights,
    quality: QualityReport,
    attributes: AttributeReport,
    spatial: SpatialReport,
}

impl Profile {
    /// Run all checks over the dataset.
    pub fn new(dataset: Dataset, config: CheckConfig) -> Result<Self> {
        let span = tracing::info_span!("profile", dataset = dataset.name());
        let _guard = span.enter();

        let quality = assess(dataset.store(), &config)?;
        let attributes = profile_attributes(dataset.properties());
        let spatial = analyze(dataset.store(), quality.geometry.types.dominant_type);
        tracing::info!(
            features = dataset.len(),
            columns = attributes.column_count(),
            "Profile complete"
        );
        Ok(Self {
            dataset,
            config,
            weights: ScoreWeights::default(),
            quality,
            attributes,
            spatial,
        })
    }

    /// Use different score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn quality(&self) -> &QualityReport {
        &self.quality
    }

    pub fn attributes(&self) -> &AttributeReport {
        &self.attributes
    }

    pub fn spatial(&self) -> &SpatialReport {
        &self.spatial
    }

    /// Per-feature measurements in store order.
    pub fn geometry_stats(&self) -> Vec<GeometryStats> {
        geometry_stats(self.dataset.store(), &self.quality.geometry.validity)
    }

    pub fn name(&self) -> &str {
        self.dataset.name()
    }

    pub fn feature_count(&self) -> usize {
        self.dataset.len()
    }

    pub fn column_count(&self) -> usize {
        self.attributes.column_count()
    }

    /// Dominant geometry type name.
    pub fn geometry_type(&self) -> &'static str {
        self.quality.geometry.types.dominant_name()
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.dataset.store().crs()
    }

    pub fn bounds(&self) -> Option<BBox> {
        self.dataset.store().total_bounds()
    }

    /// Unrounded 0–100 quality score.
    pub fn quality_score(&self) -> f64 {
        let geometry = &self.quality.geometry;
        let inputs = ScoreInputs {
            total_features: geometry.total_features,
            valid_count: geometry.validity.valid_count,
            empty_count: geometry.empty.empty_count,
            completeness: self.attributes.completeness(),
            has_crs: self.crs().is_some(),
        };
        quality_score(&inputs, &self.weights)
    }

    pub fn summary(&self) -> Summary {
        let geometry = &self.quality.geometry;
        Summary {
            name: self.name().to_string(),
            source: self
                .dataset
                .source()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string()),
            features: self.feature_count(),
            columns: self.column_count(),
            geometry_type: self.geometry_type().to_string(),
            crs: self.crs().map(|c| c.to_string()),
            bounds: self.bounds(),
            quality_score: round_score(self.quality_score()),
            geometry_checks: GeometryCounts {
                valid: geometry.validity.valid_count,
                invalid: geometry.validity.invalid_count,
                empty: geometry.empty.empty_count,
                duplicates: geometry.duplicates.duplicate_count,
            },
            attribute_completeness: self.attributes.column_completeness(),
            column_dtypes: self.attributes.column_dtypes(),
            spatial: self.spatial.clone(),
        }
    }

    pub fn quality_checks(&self) -> Vec<QualityCheck> {
        quality_checks(&self.quality, &self.attributes, self.crs())
    }

    /// Engine record extended with dataset-level keys.
    pub fn record(&self) -> CheckResult {
        let mut record = self.quality.to_record();
        record.insert(keys::DATASET_NAME, CheckValue::Text(self.name().to_string()));
        record.insert(keys::COLUMN_COUNT, CheckValue::Count(self.column_count()));
        record.insert(keys::TOTAL_NULLS, CheckValue::Count(self.attributes.total_nulls));
        record.insert(keys::COMPLETENESS, CheckValue::Ratio(self.attributes.completeness()));
        record.insert(
            keys::CRS,
            CheckValue::Text(self.crs().map(|c| c.to_string()).unwrap_or_default()),
        );
        record.insert(
            keys::QUALITY_SCORE,
            CheckValue::Ratio(round_score(self.quality_score())),
        );
        record.insert(keys::COLUMN_DTYPES, CheckValue::Labels(self.attributes.column_dtypes()));

        let spatial = &self.spatial;
        if let Some(units) = &spatial.crs.units {
            record.insert(keys::CRS_UNITS, CheckValue::Text(units.clone()));
        }
        if let Some(geographic) = spatial.crs.is_geographic {
            record.insert(keys::CRS_IS_GEOGRAPHIC, CheckValue::Flag(geographic));
        }
        if let Some(projected) = spatial.crs.is_projected {
            record.insert(keys::CRS_IS_PROJECTED, CheckValue::Flag(projected));
        }
        if let (Some(x), Some(y)) = (spatial.center_x, spatial.center_y) {
            record.insert(keys::CENTER_X, CheckValue::Ratio(x));
            record.insert(keys::CENTER_Y, CheckValue::Ratio(y));
        }
        let measures = [
            (keys::AREA_STATS, &spatial.area_stats),
            (keys::PERIMETER_STATS, &spatial.perimeter_stats),
            (keys::LENGTH_STATS, &spatial.length_stats),
        ];
        for (key, stats) in measures {
            if let Some(stats) = stats {
                record.insert(key, CheckValue::Measures(stats.to_measures()));
            }
        }
        record
    }

    /// Dataset with every invalid geometry repaired. Attributes are kept.
    pub fn fix_invalid(&self) -> Dataset {
        let fixed = geoqa_geometry::fix_invalid(self.dataset.store());
        self.dataset.with_store(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "name": "blocks",
        "crs": "EPSG:4326",
        "features": [
            {"wkt": "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))", "properties": {"name": "a"}},
            {"wkt": "POLYGON((0 0, 1 1, 1 0, 0 1, 0 0))", "properties": {"name": null}},
            {"wkt": "POLYGON((5 5, 6 5, 6 6, 5 6, 5 5))", "properties": {"name": "c"}},
            {"wkt": "POLYGON((5 5, 6 5, 6 6, 5 6, 5 5))", "properties": {"name": "d"}}
        ]
    }"#;

    fn profile() -> Profile {
        let dataset = Dataset::from_json_str(DOC, "x").unwrap();
        Profile::new(dataset, CheckConfig::default()).unwrap()
    }

    #[test]
    fn test_summary() {
        let summary = profile().summary();
        assert_eq!(summary.name, "blocks");
        assert_eq!(summary.features, 4);
        assert_eq!(summary.columns, 1);
        assert_eq!(summary.geometry_type, "Polygon");
        assert_eq!(summary.crs.as_deref(), Some("EPSG:4326"));
        assert_eq!(summary.geometry_checks.invalid, 1);
        assert_eq!(summary.geometry_checks.valid, 3);
        assert_eq!(summary.geometry_checks.duplicates, 1);
        assert_eq!(summary.attribute_completeness["name"], 75.0);
        // 30 + 22.5 + 15 + 15
        assert_eq!(summary.quality_score, 82.5);
        let bounds = summary.bounds.unwrap();
        assert_eq!((bounds.min_x, bounds.max_y), (0.0, 6.0));
    }

    #[test]
    fn test_record_extends_engine_keys() {
        let record = profile().record();
        assert_eq!(record.count(keys::COLUMN_COUNT), Some(1));
        assert_eq!(record.count(keys::TOTAL_NULLS), Some(1));
        assert_eq!(record.count(geoqa_geometry::keys::DUPLICATE_COUNT), Some(1));
        assert_eq!(
            record.get(keys::QUALITY_SCORE),
            Some(&CheckValue::Ratio(82.5))
        );
    }

    #[test]
    fn test_spatial_in_summary_and_record() {
        let p = profile();
        let summary = p.summary();
        assert_eq!(summary.spatial.crs.units.as_deref(), Some("degree"));
        assert_eq!(summary.spatial.center_x, Some(3.0));
        assert_eq!(summary.column_dtypes["name"], "string");
        // the bowtie's signed lobes cancel
        let area = summary.spatial.area_stats.as_ref().unwrap();
        assert_eq!(area.total, 3.0);

        let record = p.record();
        assert_eq!(record.get(keys::CRS_IS_GEOGRAPHIC), Some(&CheckValue::Flag(true)));
        assert_eq!(record.get(keys::CENTER_Y), Some(&CheckValue::Ratio(3.0)));
        let measures = record.get(keys::AREA_STATS).and_then(CheckValue::as_measures).unwrap();
        assert_eq!(measures["count"], 4.0);
        assert!(!record.contains_key(keys::LENGTH_STATS));

        let rows = p.geometry_stats();
        assert_eq!(rows.len(), 4);
        assert!(!rows[1].is_valid);
        assert_eq!(rows[0].area, 1.0);
    }

    #[test]
    fn test_fix_invalid_keeps_attributes() {
        let p = profile();
        let fixed = p.fix_invalid();
        assert_eq!(fixed.properties(), p.dataset().properties());
        let refreshed = Profile::new(fixed, CheckConfig::default()).unwrap();
        assert_eq!(refreshed.quality().geometry.validity.invalid_count, 0);
        assert!(refreshed.quality_score() > p.quality_score());
    }
}
