//! Geometry quality engine for vector datasets.
//!
//! Given an ordered collection of features (each an optional geometry plus a
//! stable index), this crate produces a structured quality record:
//!
//! - **Validity** per feature (null, empty, valid, invalid with a reason)
//! - **Exact duplicates** via a canonical binary encoding
//! - **Pairwise polygon overlaps** via an R-tree prefilter and exact refine
//! - **Topology checks**: ring winding, coordinate precision, slivers
//! - **Best-effort repair** of invalid geometries into a new store
//!
//! # Architecture
//!
//! ```text
//!                         GeometryStore (read-only)
//!                                   │
//!        ┌──────────────┬───────────┼──────────────┬─────────────────┐
//!        ▼              ▼           ▼              ▼                 ▼
//!    validity        dedup      overlap        topology          vertices
//!  (classifier)  (FxHash over  (R-tree +     (winding,         (complexity)
//!                 canonical)   exact area)   precision,
//!                                            slivers)
//!        │              │           │              │                 │
//!        └──────────────┴───────────┼──────────────┴─────────────────┘
//!                                   ▼
//!                      QualityReport → CheckResult
//! ```
//!
//! No check mutates the store. [`repair::fix_invalid`] is the only operation
//! that produces geometry, and it returns a new store.
//!
//! A geometric predicate that panics on pathological input is contained to the
//! feature being evaluated (see [`error::guard`]); the batch always completes.
//!
//! # Modules
//!
//! - [`geometry`]: feature model, geometry store, CRS, envelopes, WKT input
//! - [`validity`]: validity classification, empty/null checks, type histogram
//! - [`canonical`]: canonical binary encoding used for equality
//! - [`dedup`]: exact duplicate detection
//! - [`overlap`]: spatial index and pairwise overlap scan
//! - [`topology`]: ring orientation, coordinate precision, slivers
//! - [`vertices`]: vertex counting and coordinate sampling
//! - [`repair`]: best-effort make-valid
//! - [`report`]: aggregation into a flat check record
//! - [`config`]: check thresholds
//! - [`error`]: error and fault types

pub mod canonical;
pub mod config;
pub mod dedup;
pub mod error;
pub mod geometry;
pub mod overlap;
pub mod repair;
pub mod report;
pub mod topology;
pub mod validity;
pub mod vertices;

// Re-export key types
pub use config::CheckConfig;
pub use dedup::{check_duplicates, DuplicateReport};
pub use error::{Fault, QualityError, Result};
pub use geometry::{
    ensure_finite, parse_wkt, parse_wkt_with_kind, BBox, Crs, Feature, FeatureIndex, GeometryKind,
    GeometryStore,
};
pub use overlap::{intersection_area, scan_overlaps, OverlapReport, OverlapScanner, ScanStats, SKIPPED_SENTINEL};
pub use repair::{fix_invalid, make_valid};
pub use report::{
    assess, keys, CheckResult, CheckValue, GeometryChecker, GeometryReport, QualityReport,
};
pub use topology::{PrecisionReport, RingReport, SliverReport, TopologyChecker, TopologyReport};
pub use validity::{
    check_empty, check_geometry_types, check_null, check_validity, is_valid_geometry,
    Classification, EmptyReport, NullReport, TypeReport, ValidityReport,
};
pub use vertices::{compute_complexity, count_vertices, ComplexityReport};
