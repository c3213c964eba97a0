//! Spatial index + pairwise overlap scan.
//!
//! ```text
//!   GeometryStore
//!        │  valid, non-empty polygonal features only
//!        ▼
//!   R-tree over envelopes (bulk loaded, lives for one scan)
//!        │  envelope-intersecting candidates, j > i
//!        ▼
//!   Exact refine: area(i ∩ j) > 0
//!        │
//!        ▼
//!   OverlapReport
//! ```
//!
//! Edge or point contact is not an overlap. Exact pairwise testing is bounded by
//! a feature-count ceiling: above it the scan is skipped entirely and reported
//! with `overlap_count = -1`, distinguishable from "no overlaps found".

use crate::error::{guard, Fault};
use crate::geometry::{ensure_finite, BBox, FeatureIndex, GeometryKind, GeometryStore};
use crate::validity::is_valid_geometry;
use geo::{Area, BooleanOps};
use geo_types::{Geometry, MultiPolygon};
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

/// `overlap_count` value when the scan was skipped.
pub const SKIPPED_SENTINEL: i64 = -1;

/// Result of the overlap scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlapReport {
    /// Number of overlapping pairs, or [`SKIPPED_SENTINEL`].
    pub overlap_count: i64,

    /// Overlapping `(i, j)` feature pairs, `i` before `j` in store order.
    pub overlap_pairs: Vec<(FeatureIndex, FeatureIndex)>,

    /// The feature-count ceiling was exceeded and nothing was tested.
    pub skipped: bool,
}

impl OverlapReport {
    /// Report for a scan that was not run because of the ceiling.
    pub fn skipped() -> Self {
        Self {
            overlap_count: SKIPPED_SENTINEL,
            overlap_pairs: Vec::new(),
            skipped: true,
        }
    }

    fn from_pairs(overlap_pairs: Vec<(FeatureIndex, FeatureIndex)>) -> Self {
        Self {
            overlap_count: overlap_pairs.len() as i64,
            overlap_pairs,
            skipped: false,
        }
    }
}

/// Counters collected during one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    /// Geometries inserted into the index.
    pub indexed: usize,

    /// Envelope-intersecting pairs (after the `j > i` filter).
    pub candidate_pairs: usize,

    /// Exact intersection tests performed.
    pub exact_checks: usize,

    /// Exact tests that faulted and were treated as "no overlap".
    pub faults: usize,
}

/// Envelope entry stored in the R-tree; `slot` points into the candidate list.
struct IndexedEnvelope {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A polygonal feature eligible for overlap testing.
struct Candidate {
    index: FeatureIndex,
    shape: MultiPolygon<f64>,
    envelope: AABB<[f64; 2]>,
}

fn to_aabb(bbox: &BBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

fn as_multi_polygon(geom: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}

/// Area of the exact intersection of two polygonal shapes.
pub fn intersection_area(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<f64, Fault> {
    ensure_finite(a)?;
    ensure_finite(b)?;
    guard(|| {
        let shared = a.intersection(b);
        if shared.0.is_empty() {
            0.0
        } else {
            shared.unsigned_area()
        }
    })
}

/// Pairwise overlap scanner over one store.
pub struct OverlapScanner<'a> {
    store: &'a GeometryStore,
    max_features: usize,
    stats: ScanStats,
}

impl<'a> OverlapScanner<'a> {
    /// Create a scanner with the given feature-count ceiling.
    pub fn new(store: &'a GeometryStore, max_features: usize) -> Self {
        Self {
            store,
            max_features,
            stats: ScanStats::default(),
        }
    }

    /// Statistics of the last scan.
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Run the scan. Only polygonal datasets are scanned; anything else reports
    /// zero overlaps.
    pub fn scan(&mut self, dominant_type: Option<GeometryKind>) -> OverlapReport {
        self.stats = ScanStats::default();

        if self.store.len() > self.max_features {
            tracing::info!(
                features = self.store.len(),
                max_features = self.max_features,
                "Skipping pairwise overlap scan (feature ceiling exceeded)"
            );
            return OverlapReport::skipped();
        }

        if !dominant_type.is_some_and(|k| k.is_polygonal()) {
            return OverlapReport::default();
        }

        let candidates = self.collect_candidates();
        self.stats.indexed = candidates.len();

        let tree = RTree::bulk_load(
            candidates
                .iter()
                .enumerate()
                .map(|(slot, c)| IndexedEnvelope {
                    slot,
                    envelope: c.envelope,
                })
                .collect(),
        );

        let mut pairs = Vec::new();
        for (i, a) in candidates.iter().enumerate() {
            let mut others: Vec<usize> = tree
                .locate_in_envelope_intersecting(&a.envelope)
                .map(|e| e.slot)
                .filter(|&j| j > i)
                .collect();
            others.sort_unstable();
            self.stats.candidate_pairs += others.len();

            for j in others {
                let b = &candidates[j];
                self.stats.exact_checks += 1;
                match intersection_area(&a.shape, &b.shape) {
                    Ok(area) if area > 0.0 => pairs.push((a.index, b.index)),
                    Ok(_) => {}
                    Err(fault) => {
                        self.stats.faults += 1;
                        tracing::debug!(
                            left = a.index,
                            right = b.index,
                            error = %fault,
                            "Intersection test faulted; pair treated as non-overlapping"
                        );
                    }
                }
            }
        }

        tracing::debug!(
            indexed = self.stats.indexed,
            candidate_pairs = self.stats.candidate_pairs,
            exact_checks = self.stats.exact_checks,
            faults = self.stats.faults,
            overlaps = pairs.len(),
            "Overlap scan complete"
        );

        OverlapReport::from_pairs(pairs)
    }

    /// Valid, non-empty polygonal features in store order.
    fn collect_candidates(&self) -> Vec<Candidate> {
        let mut out = Vec::new();
        for feature in self.store.iter() {
            let Some(geom) = feature.shape() else {
                continue;
            };
            let Some(shape) = as_multi_polygon(geom) else {
                continue;
            };
            match is_valid_geometry(geom) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::trace!(index = feature.index, "Invalid polygon excluded from overlap scan");
                    continue;
                }
                Err(fault) => {
                    tracing::debug!(index = feature.index, error = %fault, "Validity faulted; excluded from overlap scan");
                    continue;
                }
            }
            let Some(bbox) = BBox::from_geometry(geom) else {
                continue;
            };
            out.push(Candidate {
                index: feature.index,
                shape,
                envelope: to_aabb(&bbox),
            });
        }
        out
    }
}

/// Convenience wrapper: scan with a fresh scanner.
pub fn scan_overlaps(
    store: &GeometryStore,
    dominant_type: Option<GeometryKind>,
    max_features: usize,
) -> OverlapReport {
    OverlapScanner::new(store, max_features).scan(dominant_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(rows: &[&str]) -> GeometryStore {
        GeometryStore::from_wkt(
            rows.iter().enumerate().map(|(i, w)| (i as FeatureIndex, Some(*w))),
            None,
        )
        .unwrap()
    }

    const POLY: Option<GeometryKind> = Some(GeometryKind::Polygon);

    #[test]
    fn test_overlap_detected() {
        let s = store(&[
            "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))",
            "POLYGON((1 1, 3 1, 3 3, 1 3, 1 1))",
            "POLYGON((5 5, 6 5, 6 6, 5 6, 5 5))",
        ]);
        let report = scan_overlaps(&s, POLY, 10_000);
        assert_eq!(report.overlap_count, 1);
        assert_eq!(report.overlap_pairs, vec![(0, 1)]);
        assert!(!report.skipped);
    }

    #[test]
    fn test_edge_touch_is_not_overlap() {
        let s = store(&[
            "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))",
            "POLYGON((1 0, 2 0, 2 1, 1 1, 1 0))",
            "POLYGON((2 1, 3 1, 3 2, 2 2, 2 1))",
        ]);
        let mut scanner = OverlapScanner::new(&s, 10_000);
        let report = scanner.scan(POLY);
        assert_eq!(report.overlap_count, 0);
        assert!(report.overlap_pairs.is_empty());
        // Envelopes touch, so candidates were refined exactly.
        assert_eq!(scanner.stats().indexed, 3);
        assert!(scanner.stats().exact_checks >= 2);
    }

    #[test]
    fn test_ceiling_skips() {
        let s = store(&[
            "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))",
            "POLYGON((1 1, 3 1, 3 3, 1 3, 1 1))",
            "POLYGON((5 5, 6 5, 6 6, 5 6, 5 5))",
        ]);
        let report = scan_overlaps(&s, POLY, 2);
        assert_eq!(report.overlap_count, SKIPPED_SENTINEL);
        assert!(report.skipped);
        assert!(report.overlap_pairs.is_empty());
    }

    #[test]
    fn test_non_polygonal_dataset() {
        let s = store(&["LINESTRING(0 0, 2 2)", "LINESTRING(0 2, 2 0)"]);
        let report = scan_overlaps(&s, Some(GeometryKind::LineString), 10_000);
        assert_eq!(report, OverlapReport::default());
    }

    #[test]
    fn test_invalid_polygon_excluded() {
        let s = store(&[
            "POLYGON((0 0, 2 2, 2 0, 0 2, 0 0))",
            "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))",
        ]);
        let mut scanner = OverlapScanner::new(&s, 10_000);
        let report = scanner.scan(POLY);
        assert_eq!(report.overlap_count, 0);
        assert_eq!(scanner.stats().indexed, 1);
    }

    #[test]
    fn test_contained_polygon_overlaps() {
        let s = store(&[
            "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))",
            "MULTIPOLYGON(((2 2, 3 2, 3 3, 2 3, 2 2)), ((20 20, 21 20, 21 21, 20 21, 20 20)))",
        ]);
        let report = scan_overlaps(&s, POLY, 10_000);
        assert_eq!(report.overlap_pairs, vec![(0, 1)]);
    }
}
