//! Dataset profiling on top of the geometry quality engine.
//!
//! A [`Profile`] loads nothing itself: it takes a [`Dataset`] (geometry store
//! plus attribute rows), runs the engine and the attribute completeness pass
//! once, and derives everything else from those immutable results:
//!
//! - [`Profile::summary`]: headline counts, spatial statistics and the 0–100
//!   quality score
//! - [`Profile::quality_checks`]: PASS/WARN/FAIL table rows
//! - [`Profile::record`]: the flat JSON record for renderers
//! - [`Profile::fix_invalid`]: a repaired copy of the dataset

pub mod attributes;
pub mod checks;
pub mod dataset;
pub mod error;
pub mod profile;
pub mod score;
pub mod spatial;

pub use attributes::{profile_attributes, AttributeReport, ColumnStats, Dtype, NumericStats};
pub use checks::{quality_checks, CheckStatus, QualityCheck, Severity};
pub use dataset::{Dataset, DatasetDocument, FeatureRecord, Properties};
pub use error::{ProfileError, Result};
pub use profile::{GeometryCounts, Profile, Summary};
pub use score::{quality_score, round_score, ScoreInputs, ScoreWeights};
pub use spatial::{
    analyze, geometry_stats, CrsInfo, GeometryStats, MeasureStats, SpatialReport,
};
