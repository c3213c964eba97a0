//! Dataset loading and writing.
//!
//! Three input formats:
//! - JSON document: `{ "name"?, "crs"?, "features": [{ "id"?, "wkt", "properties"? }] }`
//! - GeoJSON (`.geojson`): a FeatureCollection, a single Feature or a bare
//!   Geometry. Numeric ids become feature indices; the CRS is EPSG:4326 unless
//!   a legacy `crs` member names another.
//! - Plain text (`.wkt` / `.txt`): one WKT per line, blank or `NULL` for a
//!   null geometry, ids taken from the line ordinal.

use crate::error::{ProfileError, Result};
use geojson::feature::Id;
use geo_types::Geometry;
use geojson::{GeoJson, JsonObject};
use geoqa_geometry::{Crs, Feature, FeatureIndex, GeometryKind, GeometryStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use wkt::ToWkt;

/// Attribute values of one feature.
pub type Properties = Map<String, Value>;

/// On-disk JSON representation of a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,

    pub features: Vec<FeatureRecord>,
}

/// One feature row of a [`DatasetDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Stable feature id. Defaults to the row ordinal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureIndex>,

    /// Geometry as WKT. `null` is a Null geometry.
    #[serde(default)]
    pub wkt: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Properties,
}

/// A loaded dataset: geometry store plus per-feature attributes.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    source: Option<PathBuf>,
    store: GeometryStore,
    /// Attribute rows, aligned with the store order.
    properties: Vec<Properties>,
}

fn format_error(path: &str, message: impl ToString) -> ProfileError {
    ProfileError::Format {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Input format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Document,
    GeoJson,
    WktLines,
}

impl Format {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("wkt" | "txt") => Format::WktLines,
            Some("geojson") => Format::GeoJson,
            _ => Format::Document,
        }
    }
}

/// Feature index from a GeoJSON id. Non-numeric ids fall back to the ordinal.
fn geojson_index(id: Option<&Id>, ordinal: usize) -> FeatureIndex {
    let parsed = match id {
        Some(Id::Number(n)) => n.as_u64(),
        Some(Id::String(s)) => s.trim().parse().ok(),
        None => None,
    };
    parsed.unwrap_or(ordinal as FeatureIndex)
}

/// CRS of a GeoJSON object. RFC 7946 fixes WGS 84; older files may carry a
/// `{"crs": {"properties": {"name": ...}}}` member.
fn geojson_crs(members: Option<&JsonObject>) -> Crs {
    let name = members
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(Value::as_str);
    let Some(name) = name else {
        return Crs::parse("EPSG:4326");
    };
    if name.ends_with("CRS84") {
        return Crs::parse("EPSG:4326");
    }
    // urn:ogc:def:crs:EPSG::3857
    match name.rsplit(':').next().map(str::parse::<u32>) {
        Some(Ok(code)) if name.contains("EPSG") => Crs::parse(&format!("EPSG:{code}")),
        _ => Crs::parse(name),
    }
}

/// WKT for a stored geometry. An empty `Point` is written as `POINT EMPTY`.
fn feature_wkt(feature: &Feature) -> Option<String> {
    let geom = feature.geometry.as_ref()?;
    if feature.is_empty() && feature.kind() == Some(GeometryKind::Point) {
        return Some("POINT EMPTY".to_string());
    }
    Some(geom.wkt_string())
}

impl Dataset {
    /// Build a dataset from parts. `properties` is padded or truncated to the
    /// store length.
    pub fn new(name: impl Into<String>, store: GeometryStore, mut properties: Vec<Properties>) -> Self {
        properties.resize_with(store.len(), Properties::new);
        Self {
            name: name.into(),
            source: None,
            store,
            properties,
        }
    }

    /// Load a dataset file. The format is chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProfileError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string();

        let mut dataset = match Format::of(path) {
            Format::WktLines => Self::from_wkt_lines(&text, stem, None),
            Format::GeoJson => Self::from_geojson_str(&text, stem),
            Format::Document => Self::from_json_str(&text, stem),
        }
        .map_err(|e| match e {
            ProfileError::Format { message, .. } => format_error(&path.display().to_string(), message),
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            features = dataset.len(),
            "Loaded dataset"
        );
        dataset.source = Some(path.to_path_buf());
        Ok(dataset)
    }

    /// Parse a JSON dataset document. `default_name` is used when the
    /// document has no name.
    pub fn from_json_str(text: &str, default_name: impl Into<String>) -> Result<Self> {
        let doc: DatasetDocument =
            serde_json::from_str(text).map_err(|e| format_error("<json>", e))?;
        Self::from_document(doc, default_name)
    }

    /// Build a dataset from a parsed document.
    pub fn from_document(doc: DatasetDocument, default_name: impl Into<String>) -> Result<Self> {
        let crs = doc.crs.as_deref().map(Crs::parse);
        let mut store = GeometryStore::new(crs);
        let mut properties = Vec::with_capacity(doc.features.len());

        for (ordinal, record) in doc.features.into_iter().enumerate() {
            let index = record.id.unwrap_or(ordinal as FeatureIndex);
            let feature = match record.wkt.as_deref() {
                Some(text) => Feature::from_wkt(index, text)?,
                None => Feature::null(index),
            };
            store.push(feature)?;
            properties.push(record.properties);
        }

        Ok(Self {
            name: doc.name.unwrap_or_else(|| default_name.into()),
            source: None,
            store,
            properties,
        })
    }

    /// Parse a GeoJSON text. A `name` member on the collection overrides
    /// `default_name`.
    pub fn from_geojson_str(text: &str, default_name: impl Into<String>) -> Result<Self> {
        let parsed: GeoJson = text.parse().map_err(|e| format_error("<geojson>", e))?;
        let (features, members) = match parsed {
            GeoJson::FeatureCollection(fc) => (fc.features, fc.foreign_members),
            GeoJson::Feature(feature) => (vec![feature], None),
            GeoJson::Geometry(geometry) => (
                vec![geojson::Feature {
                    geometry: Some(geometry),
                    ..Default::default()
                }],
                None,
            ),
        };

        let name = members
            .as_ref()
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default_name.into());
        let mut store = GeometryStore::new(Some(geojson_crs(members.as_ref())));
        let mut properties = Vec::with_capacity(features.len());

        for (ordinal, feature) in features.into_iter().enumerate() {
            let index = geojson_index(feature.id.as_ref(), ordinal);
            let geometry = match feature.geometry {
                Some(geom) => Some(Geometry::<f64>::try_from(geom).map_err(|e| {
                    format_error("<geojson>", format!("feature {index}: {e}"))
                })?),
                None => None,
            };
            store.push(Feature::new(index, geometry))?;
            properties.push(feature.properties.unwrap_or_default());
        }

        Ok(Self {
            name,
            source: None,
            store,
            properties,
        })
    }

    /// Parse one WKT per line. Blank lines and `NULL` are null geometries.
    pub fn from_wkt_lines(
        text: &str,
        name: impl Into<String>,
        crs: Option<Crs>,
    ) -> Result<Self> {
        let rows = text.lines().enumerate().map(|(i, line)| {
            let line = line.trim();
            let wkt = if line.is_empty() || line.eq_ignore_ascii_case("NULL") {
                None
            } else {
                Some(line)
            };
            (i as FeatureIndex, wkt)
        });
        let store = GeometryStore::from_wkt(rows, crs)?;
        Ok(Self::new(name, store, Vec::new()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn properties(&self) -> &[Properties] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Same dataset under a different display name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Same attributes and name with a different geometry store.
    pub fn with_store(&self, store: GeometryStore) -> Self {
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            properties: self.properties.clone(),
            store,
        }
    }

    /// Serializable document form.
    pub fn to_document(&self) -> DatasetDocument {
        let features = self
            .store
            .iter()
            .zip(&self.properties)
            .map(|(feature, props)| FeatureRecord {
                id: Some(feature.index),
                wkt: feature_wkt(feature),
                properties: props.clone(),
            })
            .collect();
        DatasetDocument {
            name: Some(self.name.clone()),
            crs: self.store.crs().map(|c| c.to_string()),
            features,
        }
    }

    /// Write the dataset as a pretty-printed JSON document.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_document())?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoqa_geometry::QualityError;

    const DOC: &str = r#"{
        "name": "parcels",
        "crs": "EPSG:4326",
        "features": [
            {"id": 7, "wkt": "POINT(1 2)", "properties": {"owner": "a"}},
            {"id": 9, "wkt": null}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let ds = Dataset::from_json_str(DOC, "fallback").unwrap();
        assert_eq!(ds.name(), "parcels");
        assert_eq!(ds.len(), 2);
        assert!(ds.store().get(9).unwrap().is_null());
        assert_eq!(ds.store().crs().and_then(Crs::epsg), Some(4326));
        assert_eq!(ds.properties()[0]["owner"], "a");
        assert!(ds.properties()[1].is_empty());
    }

    #[test]
    fn test_ids_default_to_ordinal() {
        let ds = Dataset::from_json_str(
            r#"{"features": [{"wkt": "POINT(0 0)"}, {"wkt": "POINT(1 1)"}]}"#,
            "unnamed",
        )
        .unwrap();
        assert_eq!(ds.name(), "unnamed");
        assert!(ds.store().get(1).is_ok());
        assert!(ds.store().crs().is_none());
    }

    #[test]
    fn test_bad_json_is_format_error() {
        let err = Dataset::from_json_str("{not json", "x").unwrap_err();
        assert!(matches!(err, ProfileError::Format { .. }));
    }

    #[test]
    fn test_bad_wkt_is_quality_error() {
        let err = Dataset::from_json_str(r#"{"features": [{"wkt": "POLYGON(("}]}"#, "x")
            .unwrap_err();
        assert!(matches!(err, ProfileError::Quality(QualityError::WktParse { index: 0, .. })));
    }

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "name": "wells",
        "features": [
            {"type": "Feature", "id": 12, "properties": {"depth": 40},
             "geometry": {"type": "Point", "coordinates": [1.5, 2.5]}},
            {"type": "Feature", "id": "w-2", "properties": {"depth": null},
             "geometry": null},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "Polygon",
                          "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}}
        ]
    }"#;

    #[test]
    fn test_parse_geojson_collection() {
        let ds = Dataset::from_geojson_str(GEOJSON, "fallback").unwrap();
        assert_eq!(ds.name(), "wells");
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.store().crs().and_then(Crs::epsg), Some(4326));

        let well = ds.store().get(12).unwrap();
        assert_eq!(well.kind(), Some(GeometryKind::Point));
        // non-numeric id falls back to the ordinal
        assert!(ds.store().get(1).unwrap().is_null());
        assert_eq!(ds.store().get(2).unwrap().kind(), Some(GeometryKind::Polygon));

        assert_eq!(ds.properties()[0]["depth"], 40);
        assert!(ds.properties()[1]["depth"].is_null());
        assert!(ds.properties()[2].is_empty());
    }

    #[test]
    fn test_geojson_legacy_crs_member() {
        let text = r#"{"type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": []}"#;
        let ds = Dataset::from_geojson_str(text, "x").unwrap();
        assert_eq!(ds.store().crs().and_then(Crs::epsg), Some(3857));
        assert!(ds.is_empty());
    }

    #[test]
    fn test_geojson_bare_geometry() {
        let ds = Dataset::from_geojson_str(
            r#"{"type": "LineString", "coordinates": [[0, 0], [3, 4]]}"#,
            "line",
        )
        .unwrap();
        assert_eq!(ds.name(), "line");
        assert_eq!(ds.store().get(0).unwrap().kind(), Some(GeometryKind::LineString));
    }

    #[test]
    fn test_bad_geojson_is_format_error() {
        let err = Dataset::from_geojson_str(r#"{"type": "Nope"}"#, "x").unwrap_err();
        assert!(matches!(err, ProfileError::Format { .. }));
    }

    #[test]
    fn test_point_empty_written_back_as_point() {
        let ds = Dataset::from_json_str(r#"{"features": [{"wkt": "POINT EMPTY"}]}"#, "x").unwrap();
        let doc = ds.to_document();
        assert_eq!(doc.features[0].wkt.as_deref(), Some("POINT EMPTY"));
        let reloaded = Dataset::from_document(doc, "x").unwrap();
        assert_eq!(reloaded.store().features(), ds.store().features());
    }

    #[test]
    fn test_wkt_lines() {
        let ds = Dataset::from_wkt_lines("POINT(0 0)\n\nNULL\nPOINT(1 1)\n", "lines", None).unwrap();
        assert_eq!(ds.len(), 4);
        assert!(ds.store().get(1).unwrap().is_null());
        assert!(ds.store().get(2).unwrap().is_null());
        assert_eq!(ds.properties().len(), 4);
    }

    #[test]
    fn test_document_roundtrip_keeps_ids() {
        let ds = Dataset::from_json_str(DOC, "fallback").unwrap();
        let doc = ds.to_document();
        assert_eq!(doc.features[0].id, Some(7));
        assert_eq!(doc.features[1].wkt, None);
        assert_eq!(doc.crs.as_deref(), Some("EPSG:4326"));

        let reloaded = Dataset::from_document(doc, "x").unwrap();
        assert_eq!(reloaded.store().features(), ds.store().features());
    }
}
