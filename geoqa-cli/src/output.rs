use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use geoqa_profile::{MeasureStats, QualityCheck, Summary};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Colour a 0–100 score: green from 80, yellow from 60, red below.
pub fn format_score(score: f64) -> String {
    let text = format!("{score:.1}/100");
    if score >= 80.0 {
        text.green().bold().to_string()
    } else if score >= 60.0 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// Dataset overview plus headline geometry counts.
pub fn format_summary_table(summary: &Summary) -> String {
    let mut overview = new_table(&["Property", "Value"]);
    overview.add_row(vec!["Source".to_string(), summary.source.clone()]);
    overview.add_row(vec!["Features".to_string(), summary.features.to_string()]);
    overview.add_row(vec!["Columns".to_string(), summary.columns.to_string()]);
    overview.add_row(vec![
        "Geometry Type".to_string(),
        summary.geometry_type.clone(),
    ]);
    let spatial = &summary.spatial;
    let crs = match (&summary.crs, &spatial.crs.units) {
        (Some(crs), Some(units)) => format!("{crs} ({units})"),
        (Some(crs), None) => crs.clone(),
        (None, _) => "(none)".to_string(),
    };
    overview.add_row(vec!["CRS".to_string(), crs]);
    if let Some(b) = &summary.bounds {
        overview.add_row(vec![
            "Extent".to_string(),
            format!(
                "({:.4}, {:.4}) → ({:.4}, {:.4})",
                b.min_x, b.min_y, b.max_x, b.max_y
            ),
        ]);
    }
    if let (Some(x), Some(y)) = (spatial.center_x, spatial.center_y) {
        overview.add_row(vec!["Center".to_string(), format!("({x:.4}, {y:.4})")]);
    }
    let measures = [
        ("Area", &spatial.area_stats),
        ("Perimeter", &spatial.perimeter_stats),
        ("Length", &spatial.length_stats),
    ];
    for (label, stats) in measures {
        if let Some(stats) = stats {
            overview.add_row(vec![label.to_string(), format_measure(stats)]);
        }
    }
    overview.add_row(vec![
        "Quality Score".to_string(),
        format!("{:.1}/100", summary.quality_score),
    ]);

    let counts = &summary.geometry_checks;
    let mut checks = new_table(&["Check", "Result"]);
    checks.add_row(vec!["Valid".to_string(), counts.valid.to_string()]);
    checks.add_row(vec!["Invalid".to_string(), counts.invalid.to_string()]);
    checks.add_row(vec!["Empty".to_string(), counts.empty.to_string()]);
    checks.add_row(vec!["Duplicates".to_string(), counts.duplicates.to_string()]);

    let mut out = format!(
        "{}\n{overview}\n\n{checks}",
        format!("GeoQA Profile: {}", summary.name).cyan().bold()
    );
    if !summary.column_dtypes.is_empty() {
        let mut columns = new_table(&["Column", "Type", "Complete"]);
        for (name, dtype) in &summary.column_dtypes {
            let complete = summary
                .attribute_completeness
                .get(name)
                .map(|c| format!("{c:.1}%"))
                .unwrap_or_default();
            columns.add_row(vec![name.clone(), dtype.clone(), complete]);
        }
        out.push_str(&format!("\n\n{columns}"));
    }
    out
}

/// `total / mean / min–max` of one measurement column.
fn format_measure(stats: &MeasureStats) -> String {
    format!(
        "total {:.4}, mean {:.4}, range {:.4}–{:.4}",
        stats.total, stats.mean, stats.min, stats.max
    )
}

/// Quality-check table.
pub fn format_checks_table(checks: &[QualityCheck]) -> String {
    let mut table = new_table(&["Check", "Status", "Count", "Severity", "Details"]);
    for check in checks {
        table.add_row(vec![
            check.check.to_string(),
            check.status.as_str().to_string(),
            check.count.to_string(),
            check.severity.to_string(),
            check.details.clone(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoqa_profile::{CheckStatus, Severity};

    #[test]
    fn test_checks_table_contains_rows() {
        colored::control::set_override(false);
        let checks = vec![QualityCheck {
            check: "Geometry Validity",
            status: CheckStatus::Fail,
            count: 3,
            severity: Severity::High,
            details: "3 invalid geometries found".to_string(),
        }];
        let table = format_checks_table(&checks);
        assert!(table.contains("Geometry Validity"));
        assert!(table.contains("FAIL"));
        assert!(table.contains("High"));
    }

    #[test]
    fn test_summary_table_spatial_rows() {
        colored::control::set_override(false);
        let dataset = geoqa_profile::Dataset::from_json_str(
            r#"{"crs": "EPSG:32633", "features": [
                {"wkt": "POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))", "properties": {"zone": "R1", "floors": 3}}
            ]}"#,
            "zones",
        )
        .unwrap();
        let profile =
            geoqa_profile::Profile::new(dataset, geoqa_geometry::CheckConfig::default()).unwrap();
        let table = format_summary_table(&profile.summary());
        assert!(table.contains("EPSG:32633 (metre)"));
        assert!(table.contains("Center"));
        assert!(table.contains("total 16.0000"));
        assert!(table.contains("Perimeter"));
        assert!(table.contains("floors"));
        assert!(table.contains("integer"));
    }

    #[test]
    fn test_format_score() {
        colored::control::set_override(false);
        assert_eq!(format_score(87.46), "87.5/100");
    }
}
