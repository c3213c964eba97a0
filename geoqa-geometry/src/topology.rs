//! Topology checks: ring orientation, coordinate precision, slivers, overlaps.
//!
//! Per-feature evaluation goes through [`guard`]; a faulting feature is left
//! out of that one check and the batch continues.

use crate::config::CheckConfig;
use crate::error::{guard, Fault};
use crate::geometry::{ensure_finite, FeatureIndex, GeometryStore};
use crate::overlap::{OverlapReport, OverlapScanner};
use crate::validity::check_geometry_types;
use crate::vertices::sample_coords;
use geo::winding_order::WindingOrder;
use geo::{Area, Winding};
use geo_types::{Geometry, LineString, Polygon};
use serde::Serialize;
use std::f64::consts::PI;

/// Result of the ring-orientation check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RingReport {
    pub bad_ring_count: usize,
    pub bad_ring_indices: Vec<FeatureIndex>,
}

/// Result of the coordinate-precision check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrecisionReport {
    pub excessive_precision_count: usize,
    pub excessive_precision_indices: Vec<FeatureIndex>,
    /// First flagged coordinates, `(index, x, y)`.
    pub precision_sample_coords: Vec<(FeatureIndex, f64, f64)>,
}

/// Result of the sliver check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SliverReport {
    pub sliver_count: usize,
    pub sliver_indices: Vec<FeatureIndex>,
}

/// All topology check results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyReport {
    pub rings: RingReport,
    pub precision: PrecisionReport,
    pub slivers: SliverReport,
    pub overlaps: OverlapReport,
}

fn polygons_of(geom: &Geometry<f64>) -> Option<&[Polygon<f64>]> {
    match geom {
        Geometry::Polygon(p) => Some(std::slice::from_ref(p)),
        Geometry::MultiPolygon(mp) => Some(&mp.0),
        _ => None,
    }
}

/// Whether any exterior ring winds clockwise. `None` for non-polygonal input.
///
/// A degenerate ring (collinear or fewer than three distinct points) has no
/// winding order and is not flagged. Interior rings are not checked.
pub fn has_clockwise_exterior(geom: &Geometry<f64>) -> Option<bool> {
    polygons_of(geom).map(|polys| {
        polys
            .iter()
            .any(|p| p.exterior().winding_order() == Some(WindingOrder::Clockwise))
    })
}

/// Count significant decimal places of a value, trailing zeros trimmed,
/// at 15-digit fixed-point resolution.
pub fn decimal_places(value: f64) -> usize {
    let text = format!("{:.15}", value);
    let trimmed = text.trim_end_matches('0');
    match trimmed.split_once('.') {
        Some((_, frac)) => frac.len(),
        None => 0,
    }
}

fn ring_length(ring: &LineString<f64>) -> f64 {
    ring.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

fn perimeter(polys: &[Polygon<f64>]) -> f64 {
    polys
        .iter()
        .map(|p| ring_length(p.exterior()) + p.interiors().iter().map(ring_length).sum::<f64>())
        .sum()
}

/// Polsby-Popper compactness `4π·area / perimeter²`.
///
/// `None` for non-polygonal input and for zero-perimeter (degenerate) polygons.
pub fn compactness(geom: &Geometry<f64>) -> Option<f64> {
    let polys = polygons_of(geom)?;
    let perimeter = perimeter(polys);
    if perimeter <= 0.0 {
        return None;
    }
    let area: f64 = polys.iter().map(|p| p.unsigned_area()).sum();
    Some(4.0 * PI * area / (perimeter * perimeter))
}

fn log_fault(check: &'static str, index: FeatureIndex, fault: &Fault) {
    tracing::debug!(check, index, error = %fault, "Topology check faulted; feature excluded");
}

/// Topology checks over one store.
pub struct TopologyChecker<'a> {
    store: &'a GeometryStore,
    config: &'a CheckConfig,
}

impl<'a> TopologyChecker<'a> {
    pub fn new(store: &'a GeometryStore, config: &'a CheckConfig) -> Self {
        Self { store, config }
    }

    /// Run every topology check. The overlap scan honours `max_features`.
    pub fn check_all(&self) -> TopologyReport {
        let dominant = check_geometry_types(self.store).dominant_type;
        TopologyReport {
            rings: self.check_ring_validity(),
            precision: self.check_coordinate_precision(),
            slivers: self.check_slivers(),
            overlaps: OverlapScanner::new(self.store, self.config.max_features).scan(dominant),
        }
    }

    /// Run the overlap scan without the feature ceiling.
    pub fn check_self_overlaps(&self) -> OverlapReport {
        let dominant = check_geometry_types(self.store).dominant_type;
        OverlapScanner::new(self.store, usize::MAX).scan(dominant)
    }

    /// Flag polygonal features with a clockwise exterior ring.
    pub fn check_ring_validity(&self) -> RingReport {
        let mut bad_ring_indices = Vec::new();
        for feature in self.store.iter() {
            let Some(geom) = feature.shape() else {
                continue;
            };
            match ensure_finite(geom).and_then(|()| guard(|| has_clockwise_exterior(geom))) {
                Ok(Some(true)) => bad_ring_indices.push(feature.index),
                Ok(_) => {}
                Err(fault) => log_fault("ring_winding", feature.index, &fault),
            }
        }
        RingReport {
            bad_ring_count: bad_ring_indices.len(),
            bad_ring_indices,
        }
    }

    /// Flag features whose sampled coordinates carry too many decimals.
    pub fn check_coordinate_precision(&self) -> PrecisionReport {
        let max_decimals = self.config.max_decimals;
        let mut report = PrecisionReport::default();

        for feature in self.store.iter() {
            let Some(geom) = feature.shape() else {
                continue;
            };
            let sample = guard(|| {
                sample_coords(geom, self.config.precision_sample_size)
                    .into_iter()
                    .find(|&(x, y)| decimal_places(x) > max_decimals || decimal_places(y) > max_decimals)
            });
            match sample {
                Ok(Some((x, y))) => {
                    report.excessive_precision_indices.push(feature.index);
                    if report.precision_sample_coords.len() < self.config.precision_examples {
                        report.precision_sample_coords.push((feature.index, x, y));
                    }
                }
                Ok(None) => {}
                Err(fault) => log_fault("coordinate_precision", feature.index, &fault),
            }
        }

        report.excessive_precision_count = report.excessive_precision_indices.len();
        report
    }

    /// Flag polygons whose compactness falls below the sliver threshold.
    pub fn check_slivers(&self) -> SliverReport {
        let threshold = self.config.sliver_threshold;
        let mut sliver_indices = Vec::new();
        for feature in self.store.iter() {
            let Some(geom) = feature.shape() else {
                continue;
            };
            match ensure_finite(geom).and_then(|()| guard(|| compactness(geom))) {
                Ok(Some(ratio)) if ratio < threshold => sliver_indices.push(feature.index),
                Ok(_) => {}
                Err(fault) => log_fault("sliver", feature.index, &fault),
            }
        }
        SliverReport {
            sliver_count: sliver_indices.len(),
            sliver_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_wkt;

    fn store(rows: &[&str]) -> GeometryStore {
        GeometryStore::from_wkt(
            rows.iter().enumerate().map(|(i, w)| (i as FeatureIndex, Some(*w))),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(-3.25), 2);
        assert_eq!(decimal_places(2.75), 2);
        assert!(decimal_places(1.123456789) >= 9);
        assert_eq!(decimal_places(0.1), 1);
    }

    #[test]
    fn test_clockwise_exterior_flagged() {
        let cw = "POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))";
        let ccw = "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))";
        let s = store(&[cw, ccw, "LINESTRING(0 0, 1 1)"]);
        let config = CheckConfig::default();
        let report = TopologyChecker::new(&s, &config).check_ring_validity();
        assert_eq!(report.bad_ring_indices, vec![0]);
        assert_eq!(report.bad_ring_count, 1);
    }

    #[test]
    fn test_multipolygon_flagged_once() {
        let s = store(&[
            "MULTIPOLYGON(((0 0, 0 1, 1 1, 1 0, 0 0)), ((5 5, 5 6, 6 6, 6 5, 5 5)))",
        ]);
        let config = CheckConfig::default();
        let report = TopologyChecker::new(&s, &config).check_ring_validity();
        assert_eq!(report.bad_ring_indices, vec![0]);
    }

    #[test]
    fn test_sliver_detection() {
        let sliver = parse_wkt("POLYGON((0 0, 10 0, 10 0.001, 0 0.001, 0 0))").unwrap();
        let square = parse_wkt("POLYGON((0 5, 5 5, 5 10, 0 10, 0 5))").unwrap();
        assert!(compactness(&sliver).unwrap() < 0.001);
        assert!((compactness(&square).unwrap() - PI / 4.0).abs() < 1e-9);

        let s = store(&[
            "POLYGON((0 0, 10 0, 10 0.001, 0 0.001, 0 0))",
            "POLYGON((0 5, 5 5, 5 10, 0 10, 0 5))",
        ]);
        let config = CheckConfig::default();
        let report = TopologyChecker::new(&s, &config).check_slivers();
        assert_eq!(report.sliver_indices, vec![0]);
    }

    #[test]
    fn test_zero_perimeter_skipped() {
        let degenerate = parse_wkt("POLYGON((1 1, 1 1, 1 1, 1 1))").unwrap();
        assert_eq!(compactness(&degenerate), None);
        assert_eq!(compactness(&parse_wkt("POINT(0 0)").unwrap()), None);
    }

    #[test]
    fn test_precision_flagged() {
        let s = store(&[
            "POLYGON((31.123456789012345 30.123456789012345, 31.223456789012345 30.123456789012345, 31.223456789012345 30.223456789012345, 31.123456789012345 30.123456789012345))",
            "POINT(31.5 30.25)",
        ]);
        let config = CheckConfig::default().with_max_decimals(6);
        let report = TopologyChecker::new(&s, &config).check_coordinate_precision();
        assert_eq!(report.excessive_precision_count, 1);
        assert_eq!(report.excessive_precision_indices, vec![0]);
        assert_eq!(report.precision_sample_coords.len(), 1);
        assert_eq!(report.precision_sample_coords[0].0, 0);
    }

    #[test]
    fn test_precision_examples_capped() {
        let rows: Vec<String> = (0..8)
            .map(|i| format!("POINT({}.123456789123 1)", i))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let s = store(&refs);
        let config = CheckConfig::default();
        let report = TopologyChecker::new(&s, &config).check_coordinate_precision();
        assert_eq!(report.excessive_precision_count, 8);
        assert_eq!(report.precision_sample_coords.len(), 5);
    }

    #[test]
    fn test_non_finite_polygon_skipped_by_ring_and_sliver_checks() {
        use geo_types::polygon;
        let nan_cw: Polygon<f64> = polygon![
            (x: 0., y: 0.), (x: 0., y: f64::NAN), (x: 1., y: 1.), (x: 1., y: 0.), (x: 0., y: 0.)
        ];
        let cw: Polygon<f64> = polygon![
            (x: 0., y: 0.), (x: 0., y: 1.), (x: 1., y: 1.), (x: 1., y: 0.), (x: 0., y: 0.)
        ];
        let s = GeometryStore::from_geometries(
            [Some(Geometry::Polygon(nan_cw)), Some(Geometry::Polygon(cw))],
            None,
        );
        let config = CheckConfig::default();
        let checker = TopologyChecker::new(&s, &config);
        assert_eq!(checker.check_ring_validity().bad_ring_indices, vec![1]);
        assert_eq!(checker.check_slivers().sliver_count, 0);
    }

    #[test]
    fn test_check_all_respects_ceiling() {
        let s = store(&[
            "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))",
            "POLYGON((1 0, 2 0, 2 1, 1 1, 1 0))",
            "POLYGON((0 1, 1 1, 1 2, 0 2, 0 1))",
            "POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))",
            "POLYGON((2 0, 3 0, 3 1, 2 1, 2 0))",
        ]);
        let config = CheckConfig::default().with_max_features(2);
        let checker = TopologyChecker::new(&s, &config);
        let report = checker.check_all();
        assert_eq!(report.overlaps.overlap_count, -1);
        assert!(report.overlaps.skipped);

        // Direct scan ignores the ceiling.
        let direct = checker.check_self_overlaps();
        assert_eq!(direct.overlap_count, 0);
        assert!(!direct.skipped);
    }
}
