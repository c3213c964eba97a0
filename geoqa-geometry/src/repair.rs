//! Best-effort repair of invalid geometries.
//!
//! Polygonal shapes are rebuilt by a union against an empty multipolygon, which
//! re-nodes the rings and resolves self-intersections. Line strings lose
//! non-finite and consecutive repeated coordinates. Collections are repaired
//! member by member. Anything still failing the predicate is returned as is.

use crate::error::guard;
use crate::geometry::{Feature, GeometryStore};
use crate::validity::is_valid_geometry;
use geo::BooleanOps;
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

fn is_finite(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn rebuild_polygonal(shape: MultiPolygon<f64>) -> Geometry<f64> {
    let mut unioned = shape.union(&MultiPolygon::<f64>::new(Vec::new()));
    if unioned.0.len() == 1 {
        if let Some(polygon) = unioned.0.pop() {
            return Geometry::Polygon(polygon);
        }
    }
    Geometry::MultiPolygon(unioned)
}

fn clean_line(line: &LineString<f64>) -> Geometry<f64> {
    let mut coords: Vec<Coord<f64>> = line.0.iter().copied().filter(is_finite).collect();
    coords.dedup();
    match coords.len() {
        1 => Geometry::Point(Point(coords[0])),
        _ => Geometry::LineString(LineString::new(coords)),
    }
}

fn clean_points(points: &MultiPoint<f64>) -> Geometry<f64> {
    Geometry::MultiPoint(MultiPoint::new(
        points.0.iter().copied().filter(|p| is_finite(&p.0)).collect(),
    ))
}

fn strip_non_finite(polygon: &Polygon<f64>) -> Polygon<f64> {
    let ring = |r: &LineString<f64>| LineString::new(r.0.iter().copied().filter(is_finite).collect());
    Polygon::new(
        ring(polygon.exterior()),
        polygon.interiors().iter().map(ring).collect(),
    )
}

/// Best-effort "make valid" transform of one geometry.
pub fn make_valid(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Polygon(p) => rebuild_polygonal(MultiPolygon::new(vec![strip_non_finite(p)])),
        Geometry::MultiPolygon(mp) => {
            rebuild_polygonal(MultiPolygon::new(mp.0.iter().map(strip_non_finite).collect()))
        }
        Geometry::LineString(ls) => clean_line(ls),
        Geometry::MultiLineString(mls) => {
            let lines = mls
                .0
                .iter()
                .filter_map(|ls| match clean_line(ls) {
                    Geometry::LineString(clean) if clean.0.len() >= 2 => Some(clean),
                    _ => None,
                })
                .collect();
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        Geometry::MultiPoint(mp) => clean_points(mp),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.0.iter().map(repair_geometry).collect(),
        )),
        other => other.clone(),
    }
}

/// Repair a geometry only if it fails the validity predicate.
///
/// A faulting predicate or a panicking repair leaves the geometry unchanged.
pub fn repair_geometry(geom: &Geometry<f64>) -> Geometry<f64> {
    match is_valid_geometry(geom) {
        Ok(true) => geom.clone(),
        Ok(false) => match guard(|| make_valid(geom)) {
            Ok(repaired) => repaired,
            Err(fault) => {
                tracing::debug!(error = %fault, "Repair faulted; geometry kept as is");
                geom.clone()
            }
        },
        Err(fault) => {
            tracing::debug!(error = %fault, "Validity predicate faulted; geometry kept as is");
            geom.clone()
        }
    }
}

/// Return a new store with every invalid geometry replaced by its repair.
///
/// Null and empty features are copied through. The CRS is carried over.
pub fn fix_invalid(store: &GeometryStore) -> GeometryStore {
    let mut repaired = 0usize;
    let fixed = store.map_features(|feature| match feature.shape() {
        Some(geom) => {
            let fixed = repair_geometry(geom);
            if &fixed == geom {
                return feature.clone();
            }
            repaired += 1;
            tracing::trace!(index = feature.index, "Repaired geometry");
            Feature::new(feature.index, Some(fixed))
        }
        None => feature.clone(),
    });
    tracing::debug!(repaired, total = store.len(), "fix_invalid complete");
    fixed
}
