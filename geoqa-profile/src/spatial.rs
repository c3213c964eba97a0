//! Spatial analysis: CRS description, extent, centre and measurement
//! statistics.
//!
//! Measurements are planar, in CRS units. Which statistics are produced
//! follows the dominant geometry type:
//! - polygonal: area and perimeter
//! - linear: length
//! - point: feature count only
//!
//! Null, empty and non-finite geometries measure zero and are still counted.

use geo::{Area, Centroid, Euclidean, Length};
use geo_types::{Geometry, Polygon};
use geoqa_geometry::{
    count_vertices, ensure_finite, BBox, Crs, Feature, FeatureIndex, GeometryKind, GeometryStore,
    ValidityReport,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const DEGREE: &str = "degree";
const METRE: &str = "metre";
const FOOT: &str = "foot";
const UNKNOWN: &str = "unknown";

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// What a coordinate reference means for measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrsInfo {
    pub defined: bool,
    pub epsg: Option<u32>,
    pub name: Option<String>,
    /// Axis unit: `degree`, `metre`, `foot` or `unknown`. `None` without a CRS.
    pub units: Option<String>,
    pub is_geographic: Option<bool>,
    pub is_projected: Option<bool>,
}

/// EPSG projected systems known to use metres.
fn is_metric_epsg(code: u32) -> bool {
    matches!(
        code,
        2154 | 2193 | 3035 | 3067 | 3395 | 3577 | 3857 | 27700 | 28992
            | 25828..=25838
            | 26901..=26923
            | 32601..=32660
            | 32701..=32760
    )
}

impl CrsInfo {
    /// Describe a CRS. Unrecognised codes keep `units = "unknown"` and leave
    /// the geographic/projected flags unset.
    pub fn describe(crs: Option<&Crs>) -> Self {
        let Some(crs) = crs else {
            return Self::default();
        };
        let mut info = CrsInfo {
            defined: true,
            epsg: crs.epsg(),
            name: Some(crs.to_string()),
            units: Some(UNKNOWN.to_string()),
            is_geographic: None,
            is_projected: None,
        };

        let (geographic, units) = match crs {
            _ if crs.is_geographic() => (Some(true), DEGREE),
            Crs::Authority { .. } => match info.epsg {
                Some(code) if is_metric_epsg(code) => (Some(false), METRE),
                _ => (None, UNKNOWN),
            },
            Crs::Text(text) => describe_text(text),
        };
        info.is_geographic = geographic;
        info.is_projected = geographic.map(|g| !g);
        info.units = Some(units.to_string());
        info
    }
}

/// Best-effort reading of a PROJ string or WKT CRS.
fn describe_text(text: &str) -> (Option<bool>, &'static str) {
    let lower = text.to_ascii_lowercase();
    if lower.contains("+proj=longlat") || lower.starts_with("geogcs") || lower.starts_with("geogcrs")
    {
        return (Some(true), DEGREE);
    }
    let projected = lower.contains("+proj=") || lower.starts_with("projcs") || lower.starts_with("projcrs");
    if !projected {
        return (None, UNKNOWN);
    }
    let units = if lower.contains("+units=m ") || lower.ends_with("+units=m") || lower.contains("metre") {
        METRE
    } else if lower.contains("foot") || lower.contains("+units=ft") || lower.contains("+units=us-ft") {
        FOOT
    } else {
        UNKNOWN
    };
    (Some(false), units)
}

/// Summary statistics over one measurement column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

impl MeasureStats {
    /// Statistics rounded to four decimals. `None` for no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let total: f64 = sorted.iter().sum();
        let mean = total / count as f64;
        let std = (count > 1).then(|| {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            round_to(var.sqrt(), 4)
        });

        Some(MeasureStats {
            count,
            mean: round_to(mean, 4),
            median: round_to(quantile(&sorted, 0.5), 4),
            std,
            min: round_to(sorted[0], 4),
            max: round_to(sorted[count - 1], 4),
            total: round_to(total, 4),
        })
    }

    /// Record form. `std` is left out when undefined.
    pub fn to_measures(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::from([
            ("count".to_string(), self.count as f64),
            ("mean".to_string(), self.mean),
            ("median".to_string(), self.median),
            ("min".to_string(), self.min),
            ("max".to_string(), self.max),
            ("total".to_string(), self.total),
        ]);
        if let Some(std) = self.std {
            out.insert("std".to_string(), std);
        }
        out
    }
}

/// Linear-interpolated quantile of sorted values.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

fn polygon_length(p: &Polygon<f64>) -> f64 {
    Euclidean.length(p.exterior()) + p.interiors().iter().map(|r| Euclidean.length(r)).sum::<f64>()
}

/// Planar length: perimeter for polygons, zero for points.
pub fn boundary_length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::Line(line) => Euclidean.length(line),
        Geometry::LineString(ls) => Euclidean.length(ls),
        Geometry::MultiLineString(mls) => Euclidean.length(mls),
        Geometry::Polygon(p) => polygon_length(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(polygon_length).sum(),
        Geometry::Rect(r) => polygon_length(&r.to_polygon()),
        Geometry::Triangle(t) => polygon_length(&t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(boundary_length).sum(),
    }
}

/// Finite, non-empty geometry of a feature.
fn measurable(feature: &Feature) -> Option<&Geometry<f64>> {
    feature.shape().filter(|g| ensure_finite(*g).is_ok())
}

/// `(area, length)` of one feature; zero when it cannot be measured.
fn measure(feature: &Feature) -> (f64, f64) {
    measurable(feature)
        .map(|g| (g.unsigned_area(), boundary_length(g)))
        .unwrap_or((0.0, 0.0))
}

/// Per-feature measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryStats {
    pub index: FeatureIndex,
    /// `None` for null and empty geometries.
    pub geom_type: Option<String>,
    pub area: f64,
    pub length: f64,
    pub centroid_x: Option<f64>,
    pub centroid_y: Option<f64>,
    pub vertices: usize,
    pub is_valid: bool,
    pub is_empty: bool,
}

/// Measurements for every feature, in store order.
///
/// Validity is read from `validity`; a faulted feature is reported as not valid.
pub fn geometry_stats(store: &GeometryStore, validity: &ValidityReport) -> Vec<GeometryStats> {
    let not_valid: BTreeSet<FeatureIndex> = validity
        .invalid_indices
        .iter()
        .chain(&validity.fault_indices)
        .copied()
        .collect();

    store
        .iter()
        .map(|feature| {
            let Some(geom) = feature.shape() else {
                return GeometryStats {
                    index: feature.index,
                    geom_type: None,
                    area: 0.0,
                    length: 0.0,
                    centroid_x: None,
                    centroid_y: None,
                    vertices: 0,
                    is_valid: false,
                    is_empty: true,
                };
            };
            let (area, length) = measure(feature);
            let centroid = measurable(feature).and_then(|g| g.centroid());
            GeometryStats {
                index: feature.index,
                geom_type: feature.kind().map(|k| k.name().to_string()),
                area: round_to(area, 6),
                length: round_to(length, 6),
                centroid_x: centroid.map(|c| round_to(c.x(), 6)),
                centroid_y: centroid.map(|c| round_to(c.y(), 6)),
                vertices: count_vertices(geom),
                is_valid: !not_valid.contains(&feature.index),
                is_empty: false,
            }
        })
        .collect()
}

/// Dataset-level spatial analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialReport {
    pub crs: CrsInfo,
    pub bounds: Option<BBox>,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub area_stats: Option<MeasureStats>,
    pub perimeter_stats: Option<MeasureStats>,
    pub length_stats: Option<MeasureStats>,
    /// Feature count of a point dataset.
    pub point_count: Option<usize>,
}

/// Analyse a store whose dominant type is `dominant`.
pub fn analyze(store: &GeometryStore, dominant: Option<GeometryKind>) -> SpatialReport {
    let bounds = store.total_bounds().filter(|b| {
        [b.min_x, b.min_y, b.max_x, b.max_y]
            .iter()
            .all(|v| v.is_finite())
    });
    let mut report = SpatialReport {
        crs: CrsInfo::describe(store.crs()),
        bounds: bounds.map(|b| {
            BBox::new(
                round_to(b.min_x, 6),
                round_to(b.min_y, 6),
                round_to(b.max_x, 6),
                round_to(b.max_y, 6),
            )
        }),
        center_x: bounds.map(|b| round_to((b.min_x + b.max_x) / 2.0, 6)),
        center_y: bounds.map(|b| round_to((b.min_y + b.max_y) / 2.0, 6)),
        area_stats: None,
        perimeter_stats: None,
        length_stats: None,
        point_count: None,
    };
    if store.is_empty() {
        return report;
    }

    let measures: Vec<(f64, f64)> = store.iter().map(measure).collect();
    let areas: Vec<f64> = measures.iter().map(|m| m.0).collect();
    let lengths: Vec<f64> = measures.iter().map(|m| m.1).collect();

    match dominant {
        Some(GeometryKind::Polygon | GeometryKind::MultiPolygon) => {
            report.area_stats = MeasureStats::from_values(&areas);
            report.perimeter_stats = MeasureStats::from_values(&lengths);
        }
        Some(GeometryKind::LineString | GeometryKind::MultiLineString) => {
            report.length_stats = MeasureStats::from_values(&lengths);
        }
        Some(GeometryKind::Point | GeometryKind::MultiPoint) => {
            report.point_count = Some(store.len());
        }
        Some(GeometryKind::GeometryCollection) | None => {}
    }
    report
}
