//! Vertex and coordinate extraction.
//!
//! One recursive traversal per question, pattern-matching on the geometry
//! variant: simple shapes yield their coordinates, polygons their rings, and
//! multi-part geometries and collections recurse into their members.

use crate::geometry::GeometryStore;
use geo_types::{Coord, Geometry, LineString, Polygon};
use serde::Serialize;

/// Count every vertex of a geometry, including closing ring coordinates
/// and interior rings.
pub fn count_vertices(geom: &Geometry<f64>) -> usize {
    match geom {
        Geometry::Point(_) => 1,
        Geometry::Line(_) => 2,
        Geometry::LineString(ls) => ls.0.len(),
        Geometry::Polygon(p) => polygon_vertices(p),
        Geometry::MultiPoint(mp) => mp.0.len(),
        Geometry::MultiLineString(mls) => mls.0.iter().map(|ls| ls.0.len()).sum(),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(polygon_vertices).sum(),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(count_vertices).sum(),
        Geometry::Rect(r) => polygon_vertices(&r.to_polygon()),
        Geometry::Triangle(t) => polygon_vertices(&t.to_polygon()),
    }
}

fn polygon_vertices(p: &Polygon<f64>) -> usize {
    p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>()
}

/// Take up to `n` coordinates in traversal order.
///
/// Polygons contribute their exterior ring only. Multi-part geometries recurse
/// part by part and stop as soon as `n` coordinates have been collected.
pub fn sample_coords(geom: &Geometry<f64>, n: usize) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(n);
    collect_coords(geom, n, &mut out);
    out.truncate(n);
    out
}

fn collect_coords(geom: &Geometry<f64>, n: usize, out: &mut Vec<(f64, f64)>) {
    if out.len() >= n {
        return;
    }
    match geom {
        Geometry::Point(p) => push_coords(std::iter::once(p.0), n, out),
        Geometry::Line(l) => push_coords([l.start, l.end].into_iter(), n, out),
        Geometry::LineString(ls) => push_ring(ls, n, out),
        Geometry::Polygon(p) => push_ring(p.exterior(), n, out),
        Geometry::MultiPoint(mp) => push_coords(mp.0.iter().map(|p| p.0), n, out),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                push_ring(ls, n, out);
                if out.len() >= n {
                    break;
                }
            }
        }
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                push_ring(p.exterior(), n, out);
                if out.len() >= n {
                    break;
                }
            }
        }
        Geometry::GeometryCollection(gc) => {
            for member in &gc.0 {
                collect_coords(member, n, out);
                if out.len() >= n {
                    break;
                }
            }
        }
        Geometry::Rect(r) => push_ring(r.to_polygon().exterior(), n, out),
        Geometry::Triangle(t) => push_ring(t.to_polygon().exterior(), n, out),
    }
}

fn push_ring(ls: &LineString<f64>, n: usize, out: &mut Vec<(f64, f64)>) {
    push_coords(ls.0.iter().copied(), n, out);
}

fn push_coords(coords: impl Iterator<Item = Coord<f64>>, n: usize, out: &mut Vec<(f64, f64)>) {
    let room = n.saturating_sub(out.len());
    out.extend(coords.take(room).map(|c| (c.x, c.y)));
}

/// Vertex-count statistics over a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityReport {
    pub avg_vertices: f64,
    pub max_vertices: usize,
    pub min_vertices: usize,
    pub total_vertices: usize,
}

/// Compute vertex statistics. Null and empty geometries count as 0 vertices.
pub fn compute_complexity(store: &GeometryStore) -> ComplexityReport {
    let counts: Vec<usize> = store
        .iter()
        .map(|f| f.shape().map(count_vertices).unwrap_or(0))
        .collect();

    if counts.is_empty() {
        return ComplexityReport::default();
    }

    let total: usize = counts.iter().sum();
    ComplexityReport {
        avg_vertices: total as f64 / counts.len() as f64,
        max_vertices: counts.iter().copied().max().unwrap_or(0),
        min_vertices: counts.iter().copied().min().unwrap_or(0),
        total_vertices: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_wkt;

    #[test]
    fn test_count_polygon_with_hole() {
        let geom = parse_wkt(
            "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 4, 2 2))",
        )
        .unwrap();
        assert_eq!(count_vertices(&geom), 10);
    }

    #[test]
    fn test_count_collection() {
        let geom =
            parse_wkt("GEOMETRYCOLLECTION(POINT(0 0), LINESTRING(0 0, 1 1, 2 2))").unwrap();
        assert_eq!(count_vertices(&geom), 4);
    }

    #[test]
    fn test_sample_stops_at_n() {
        let geom = parse_wkt("MULTIPOINT((1 1), (2 2), (3 3), (4 4))").unwrap();
        assert_eq!(sample_coords(&geom, 3), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    }

    #[test]
    fn test_sample_recurses_into_parts() {
        let geom = parse_wkt(
            "MULTIPOLYGON(((0 0, 1 0, 0 1, 0 0)), ((5 5, 6 5, 5 6, 5 5)))",
        )
        .unwrap();
        // First part alone yields 4 coordinates, so the second is never visited.
        assert_eq!(sample_coords(&geom, 3), vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);

        let geom = parse_wkt("MULTILINESTRING((0 0, 1 1), (7 7, 8 8))").unwrap();
        assert_eq!(sample_coords(&geom, 3), vec![(0.0, 0.0), (1.0, 1.0), (7.0, 7.0)]);
    }

    #[test]
    fn test_complexity_counts_null_as_zero() {
        let store = GeometryStore::from_wkt(
            [(0, Some("LINESTRING(0 0, 1 1, 2 2, 3 3)")), (1, None)],
            None,
        )
        .unwrap();
        let report = compute_complexity(&store);
        assert_eq!(report.total_vertices, 4);
        assert_eq!(report.max_vertices, 4);
        assert_eq!(report.min_vertices, 0);
        assert_eq!(report.avg_vertices, 2.0);
    }

    #[test]
    fn test_complexity_empty_store() {
        let report = compute_complexity(&GeometryStore::new(None));
        assert_eq!(report, ComplexityReport::default());
    }
}
