//! Geometry Store and feature model.
//!
//! This module provides:
//! - [`GeometryKind`], the closed set of geometry variants the engine reasons about
//! - [`Feature`], an `(index, geometry)` pair where a `None` geometry is the Null slot
//! - [`GeometryStore`], the ordered, read-only collection every check consumes
//! - WKT parsing for building stores from text
//!
//! # Design
//!
//! `geo_types::Geometry` also carries `Line`, `Rect` and `Triangle`. They are
//! normalised to `LineString`/`Polygon` when a [`Feature`] is constructed, so
//! every check can pattern-match on the seven OGC kinds only.

use crate::error::{Fault, QualityError, Result};
use geo::{BoundingRect, CoordsIter};
use geo_types::{Geometry, GeometryCollection, LineString};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable feature key, unique within a store.
pub type FeatureIndex = u64;

/// Geometry type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum GeometryKind {
    Point = 0,
    LineString = 1,
    Polygon = 2,
    MultiPoint = 3,
    MultiLineString = 4,
    MultiPolygon = 5,
    GeometryCollection = 6,
}

impl GeometryKind {
    /// Classify a geo-types Geometry.
    pub fn from_geometry(geom: &Geometry<f64>) -> Self {
        match geom {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) | Geometry::Line(_) => GeometryKind::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                GeometryKind::Polygon
            }
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// OGC type name, used as the type-histogram key.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    /// Inverse of [`GeometryKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(GeometryKind::Point),
            "LineString" => Some(GeometryKind::LineString),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPoint" => Some(GeometryKind::MultiPoint),
            "MultiLineString" => Some(GeometryKind::MultiLineString),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            "GeometryCollection" => Some(GeometryKind::GeometryCollection),
            _ => None,
        }
    }

    /// Check if this is a polygonal type.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::MultiPolygon)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Check if this bbox intersects another (touching counts).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Compute from a geo-types Geometry. `None` for empty geometries.
    pub fn from_geometry(geom: &Geometry<f64>) -> Option<Self> {
        let rect = geom.bounding_rect()?;
        Some(Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    /// Smallest bbox containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Coordinate reference descriptor attached to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// Authority/code pair, e.g. `EPSG:4326`.
    Authority { authority: String, code: u32 },
    /// Free-form descriptor (WKT, PROJ string, name).
    Text(String),
}

impl Crs {
    /// Parse a descriptor. `AUTH:CODE` becomes [`Crs::Authority`].
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if let Some((authority, code)) = trimmed.split_once(':') {
            if let Ok(code) = code.trim().parse::<u32>() {
                return Crs::Authority {
                    authority: authority.trim().to_ascii_uppercase(),
                    code,
                };
            }
        }
        Crs::Text(trimmed.to_string())
    }

    /// EPSG code, if this is an EPSG authority descriptor.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Authority { authority, code } if authority == "EPSG" => Some(*code),
            _ => None,
        }
    }

    /// Whether the CRS is one of the common geographic (lon/lat) systems.
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg(), Some(4326 | 4269 | 4258 | 4283 | 4167))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Authority { authority, code } => write!(f, "{}:{}", authority, code),
            Crs::Text(text) => f.write_str(text),
        }
    }
}

/// Check whether a geometry has zero coordinates anywhere in its structure.
pub fn is_empty(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            false
        }
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
    }
}

/// Reject NaN or infinite coordinates before a geometry reaches a geo predicate.
pub fn ensure_finite<G>(geom: &G) -> std::result::Result<(), Fault>
where
    G: CoordsIter<Scalar = f64>,
{
    match geom
        .coords_iter()
        .find(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        Some(c) => Err(Fault::NonFinite { x: c.x, y: c.y }),
        None => Ok(()),
    }
}

/// Rewrite `Line`/`Rect`/`Triangle` into their OGC equivalents.
fn normalize(geom: Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Line(line) => Geometry::LineString(LineString::from(vec![line.start, line.end])),
        Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
        Geometry::Triangle(tri) => Geometry::Polygon(tri.to_polygon()),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.into_iter().map(normalize).collect(),
        )),
        other => other,
    }
}

/// A feature's geometry slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Stable key used to cross-reference results.
    pub index: FeatureIndex,

    /// `None` is the Null geometry.
    pub geometry: Option<Geometry<f64>>,

    /// Source type when it differs from the stored variant. geo-types has no
    /// empty `Point`, so `POINT EMPTY` is held as an empty `MultiPoint`.
    declared_kind: Option<GeometryKind>,
}

impl Feature {
    /// Create a feature, normalising the geometry variant.
    pub fn new(index: FeatureIndex, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            index,
            geometry: geometry.map(normalize),
            declared_kind: None,
        }
    }

    /// Create a feature with a Null geometry.
    pub fn null(index: FeatureIndex) -> Self {
        Self::new(index, None)
    }

    /// Parse a WKT geometry, keeping the declared type of empty geometries.
    pub fn from_wkt(index: FeatureIndex, wkt: &str) -> Result<Self> {
        let (geometry, declared) = parse_wkt_with_kind(wkt)
            .map_err(|message| QualityError::WktParse { index, message })?;
        let mut feature = Self::new(index, Some(geometry));
        if feature.kind() != Some(declared) {
            feature.declared_kind = Some(declared);
        }
        Ok(feature)
    }

    /// Geometry kind, `None` for a Null geometry.
    pub fn kind(&self) -> Option<GeometryKind> {
        let geom = self.geometry.as_ref()?;
        Some(
            self.declared_kind
                .unwrap_or_else(|| GeometryKind::from_geometry(geom)),
        )
    }

    /// Check if the geometry slot is absent.
    pub fn is_null(&self) -> bool {
        self.geometry.is_none()
    }

    /// Check if the geometry is present but has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.geometry.as_ref().is_some_and(is_empty)
    }

    /// The geometry when it is neither null nor empty.
    pub fn shape(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref().filter(|g| !is_empty(g))
    }
}

/// Ordered collection of features plus an optional CRS.
///
/// Owned by the caller; every check takes `&GeometryStore`. The only operation
/// that produces geometry changes is repair, which returns a new store.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    /// All features in insertion order.
    features: Vec<Feature>,

    /// Feature index → position in `features`.
    positions: FxHashMap<FeatureIndex, usize>,

    /// Coordinate reference, if known.
    crs: Option<Crs>,
}

impl GeometryStore {
    /// Create an empty store.
    pub fn new(crs: Option<Crs>) -> Self {
        Self {
            features: Vec::new(),
            positions: FxHashMap::default(),
            crs,
        }
    }

    /// Build a store from features, rejecting reused indices.
    pub fn from_features(
        features: impl IntoIterator<Item = Feature>,
        crs: Option<Crs>,
    ) -> Result<Self> {
        let mut store = Self::new(crs);
        for feature in features {
            store.push(feature)?;
        }
        Ok(store)
    }

    /// Build a store from geometries keyed by their ordinal position.
    pub fn from_geometries(
        geometries: impl IntoIterator<Item = Option<Geometry<f64>>>,
        crs: Option<Crs>,
    ) -> Self {
        let mut store = Self::new(crs);
        for (ordinal, geometry) in geometries.into_iter().enumerate() {
            let index = ordinal as FeatureIndex;
            store.positions.insert(index, store.features.len());
            store.features.push(Feature::new(index, geometry));
        }
        store
    }

    /// Build a store from `(index, wkt)` rows. A `None` WKT is a Null geometry.
    pub fn from_wkt<'a>(
        rows: impl IntoIterator<Item = (FeatureIndex, Option<&'a str>)>,
        crs: Option<Crs>,
    ) -> Result<Self> {
        let mut store = Self::new(crs);
        for (index, wkt) in rows {
            let feature = match wkt {
                Some(text) => Feature::from_wkt(index, text)?,
                None => Feature::null(index),
            };
            store.push(feature)?;
        }
        Ok(store)
    }

    /// Append a feature.
    pub fn push(&mut self, feature: Feature) -> Result<()> {
        if self.positions.contains_key(&feature.index) {
            return Err(QualityError::DuplicateIndex(feature.index));
        }
        self.positions.insert(feature.index, self.features.len());
        self.features.push(feature);
        Ok(())
    }

    /// New store with the same order, indices and CRS, each feature rebuilt
    /// by `f`. The rebuilt feature always keeps its source index.
    pub fn map_features(&self, mut f: impl FnMut(&Feature) -> Feature) -> Self {
        let features = self
            .features
            .iter()
            .map(|source| Feature {
                index: source.index,
                ..f(source)
            })
            .collect();
        Self {
            features,
            positions: self.positions.clone(),
            crs: self.crs.clone(),
        }
    }

    /// Look up a feature by index.
    pub fn get(&self, index: FeatureIndex) -> Result<&Feature> {
        self.positions
            .get(&index)
            .map(|&pos| &self.features[pos])
            .ok_or(QualityError::FeatureNotFound(index))
    }

    /// Position of a feature in store order.
    pub fn position(&self, index: FeatureIndex) -> Option<usize> {
        self.positions.get(&index).copied()
    }

    /// Number of features (including null and empty).
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the store has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate over features in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Features as a slice.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Coordinate reference, if any.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Replace the coordinate reference.
    pub fn with_crs(mut self, crs: Option<Crs>) -> Self {
        self.crs = crs;
        self
    }

    /// Envelope of every non-empty geometry.
    pub fn total_bounds(&self) -> Option<BBox> {
        self.features
            .iter()
            .filter_map(|f| f.shape().and_then(BBox::from_geometry))
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Parse WKT string to geo-types Geometry.
pub fn parse_wkt(wkt: &str) -> std::result::Result<Geometry<f64>, String> {
    parse_wkt_with_kind(wkt).map(|(geom, _)| geom)
}

/// Parse WKT, also returning the type named by the WKT tag.
pub fn parse_wkt_with_kind(
    wkt: &str,
) -> std::result::Result<(Geometry<f64>, GeometryKind), String> {
    use std::str::FromStr;
    use wkt::Wkt;

    let parsed = Wkt::<f64>::from_str(wkt).map_err(|e| format!("{:?}", e))?;
    let declared = match &parsed {
        Wkt::Point(_) => GeometryKind::Point,
        Wkt::LineString(_) => GeometryKind::LineString,
        Wkt::Polygon(_) => GeometryKind::Polygon,
        Wkt::MultiPoint(_) => GeometryKind::MultiPoint,
        Wkt::MultiLineString(_) => GeometryKind::MultiLineString,
        Wkt::MultiPolygon(_) => GeometryKind::MultiPolygon,
        Wkt::GeometryCollection(_) => GeometryKind::GeometryCollection,
    };
    let geom: Geometry<f64> = parsed
        .try_into()
        .map_err(|e: wkt::conversion::Error| format!("{:?}", e))?;
    Ok((geom, declared))
}
