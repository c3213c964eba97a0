//! Profile integration tests
//!
//! Loads datasets from disk in every supported format and checks the summary,
//! score, spatial statistics, check table and the repaired output file.

use geoqa_geometry::CheckConfig;
use geoqa_profile::{CheckStatus, Dataset, Profile, ProfileError};
use std::fs;
use tempfile::TempDir;

const ROADS: &str = r#"{
    "name": "roads",
    "crs": "EPSG:3857",
    "features": [
        {"id": 100, "wkt": "LINESTRING(0 0, 10 0)", "properties": {"class": "primary", "lanes": 2}},
        {"id": 101, "wkt": "LINESTRING(0 1, 10 1)", "properties": {"class": "secondary"}},
        {"id": 102, "wkt": null, "properties": {"class": "track", "lanes": null}}
    ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_json_dataset_and_profile() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "roads.json", ROADS);

    let dataset = Dataset::load(&path).unwrap();
    assert_eq!(dataset.source(), Some(path.as_path()));

    let profile = Profile::new(dataset, CheckConfig::default()).unwrap();
    let summary = profile.summary();
    assert_eq!(summary.name, "roads");
    assert_eq!(summary.features, 3);
    assert_eq!(summary.columns, 2);
    assert_eq!(summary.geometry_type, "LineString");

    let record = profile.record();
    assert_eq!(record.count("null_count"), Some(1));
    assert_eq!(record.count("total_nulls"), Some(2));
}

#[test]
fn load_wkt_lines_uses_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "parcels.wkt",
        "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))\nNULL\nPOLYGON((0 0, 1 1, 1 0, 0 1, 0 0))\n",
    );

    let profile = Profile::new(Dataset::load(&path).unwrap(), CheckConfig::default()).unwrap();
    assert_eq!(profile.name(), "parcels");
    assert_eq!(profile.feature_count(), 3);
    assert!(profile.crs().is_none());

    let checks = profile.quality_checks();
    let crs = checks.iter().find(|c| c.check == "CRS Defined").unwrap();
    assert_eq!(crs.status, CheckStatus::Fail);
    let validity = checks.iter().find(|c| c.check == "Geometry Validity").unwrap();
    assert_eq!(validity.count, 1);
}

const PARCELS_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "name": "parcels",
    "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::32636"}},
    "features": [
        {"type": "Feature", "id": 5, "properties": {"owner": "a", "value": 100},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}},
        {"type": "Feature", "id": 6, "properties": {"owner": null, "value": 250},
         "geometry": {"type": "Polygon", "coordinates": [[[20, 0], [30, 0], [30, 5], [20, 5], [20, 0]]]}},
        {"type": "Feature", "id": 7, "properties": {"owner": "c"},
         "geometry": {"type": "MultiPolygon", "coordinates": [[[[40, 0], [42, 0], [42, 2], [40, 2], [40, 0]]]]}}
    ]
}"#;

#[test]
fn load_geojson_dataset_and_profile() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "parcels.geojson", PARCELS_GEOJSON);

    let dataset = Dataset::load(&path).unwrap();
    assert_eq!(dataset.source(), Some(path.as_path()));
    assert!(dataset.store().get(7).is_ok());

    let profile = Profile::new(dataset, CheckConfig::default()).unwrap();
    let summary = profile.summary();
    assert_eq!(summary.name, "parcels");
    assert_eq!(summary.features, 3);
    assert_eq!(summary.geometry_type, "Polygon");
    assert_eq!(summary.crs.as_deref(), Some("EPSG:32636"));
    assert_eq!(summary.geometry_checks.invalid, 0);
    assert_eq!(summary.column_dtypes["value"], "integer");

    let spatial = profile.spatial();
    assert_eq!(spatial.crs.units.as_deref(), Some("metre"));
    assert_eq!(spatial.crs.is_projected, Some(true));
    let area = spatial.area_stats.as_ref().unwrap();
    assert_eq!((area.total, area.min, area.max), (154.0, 4.0, 100.0));
    let perimeter = spatial.perimeter_stats.as_ref().unwrap();
    assert_eq!(perimeter.total, 78.0);
    assert_eq!((spatial.center_x, spatial.center_y), (Some(21.0), Some(5.0)));

    let value = profile.attributes().column("value").unwrap();
    let stats = value.numeric.as_ref().unwrap();
    assert_eq!(stats.mean, 175.0);
    assert_eq!(value.null_count, 1);

    let record = profile.record();
    assert_eq!(record.count("null_count"), Some(0));
    assert_eq!(record.count("total_nulls"), Some(2));
}

#[test]
fn geojson_repair_written_as_document() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bowtie.geojson",
        r#"{"type": "Feature", "id": 3, "properties": {"k": "v"},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 2], [2, 0], [0, 2], [0, 0]]]}}"#,
    );

    let profile = Profile::new(Dataset::load(&path).unwrap(), CheckConfig::default()).unwrap();
    assert_eq!(profile.name(), "bowtie");
    assert_eq!(profile.quality().geometry.validity.invalid_indices, vec![3]);

    let out = dir.path().join("fixed.json");
    profile.fix_invalid().write_json(&out).unwrap();
    let reloaded = Profile::new(Dataset::load(&out).unwrap(), CheckConfig::default()).unwrap();
    assert_eq!(reloaded.quality().geometry.validity.invalid_count, 0);
    assert_eq!(reloaded.dataset().properties()[0]["k"], "v");
}

#[test]
fn missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = Dataset::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ProfileError::NotFound(_)));
}

#[test]
fn malformed_json_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{\"features\": [");
    let err = Dataset::load(&path).unwrap_err();
    match err {
        ProfileError::Format { path: p, .. } => assert!(p.ends_with("broken.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fixed_dataset_written_and_reloaded() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bad.json",
        r#"{"crs": "EPSG:4326", "features": [
            {"id": 1, "wkt": "POLYGON((0 0, 2 2, 2 0, 0 2, 0 0))", "properties": {"k": 1}}
        ]}"#,
    );

    let profile = Profile::new(Dataset::load(&path).unwrap(), CheckConfig::default()).unwrap();
    assert_eq!(profile.quality().geometry.validity.invalid_count, 1);

    let out = dir.path().join("fixed.json");
    profile.fix_invalid().write_json(&out).unwrap();

    let reloaded = Profile::new(Dataset::load(&out).unwrap(), CheckConfig::default()).unwrap();
    assert_eq!(reloaded.quality().geometry.validity.invalid_count, 0);
    assert_eq!(reloaded.dataset().properties()[0]["k"], 1);
    assert_eq!(reloaded.crs().map(|c| c.to_string()).as_deref(), Some("EPSG:4326"));
}
