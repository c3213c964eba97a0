//! Quality-check table.
//!
//! Turns the engine and attribute results into one row per check with a
//! PASS/WARN/FAIL/SKIP status and a severity.

use crate::attributes::AttributeReport;
use geoqa_geometry::{Crs, QualityReport};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skip => "SKIP",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::None => "None",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(s)
    }
}

/// One row of the quality-check table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCheck {
    pub check: &'static str,
    pub status: CheckStatus,
    /// Number of affected features, `-1` for a skipped check.
    pub count: i64,
    pub severity: Severity,
    pub details: String,
}

fn count_row(
    check: &'static str,
    count: usize,
    fail: CheckStatus,
    severity: Severity,
    found: &str,
    clean: &str,
) -> QualityCheck {
    let ok = count == 0;
    QualityCheck {
        check,
        status: if ok { CheckStatus::Pass } else { fail },
        count: count as i64,
        severity: if ok { Severity::None } else { severity },
        details: if ok {
            clean.to_string()
        } else {
            format!("{} {}", count, found)
        },
    }
}

fn completeness_row(attributes: &AttributeReport) -> QualityCheck {
    let nulls = attributes.total_nulls;
    let pct = attributes.null_percentage();
    let severity = if pct > 20.0 {
        Severity::High
    } else if pct > 5.0 {
        Severity::Medium
    } else if pct > 0.0 {
        Severity::Low
    } else {
        Severity::None
    };
    let status = if pct < 5.0 {
        CheckStatus::Pass
    } else if pct < 20.0 {
        CheckStatus::Warn
    } else {
        CheckStatus::Fail
    };
    QualityCheck {
        check: "Attribute Completeness",
        status,
        count: nulls as i64,
        severity,
        details: format!("{} null values ({:.1}% of all cells)", nulls, pct),
    }
}

fn overlap_row(report: &QualityReport) -> QualityCheck {
    let overlaps = &report.topology.overlaps;
    if overlaps.skipped {
        return QualityCheck {
            check: "Overlapping Polygons",
            status: CheckStatus::Skip,
            count: overlaps.overlap_count,
            severity: Severity::None,
            details: format!(
                "Skipped: {} features exceed the overlap scan limit",
                report.geometry.total_features
            ),
        };
    }
    count_row(
        "Overlapping Polygons",
        overlaps.overlap_pairs.len(),
        CheckStatus::Warn,
        Severity::Medium,
        "overlapping polygon pairs found",
        "No overlapping polygons",
    )
}

/// Build the quality-check table.
pub fn quality_checks(
    report: &QualityReport,
    attributes: &AttributeReport,
    crs: Option<&Crs>,
) -> Vec<QualityCheck> {
    let geometry = &report.geometry;
    let topology = &report.topology;
    let mut checks = Vec::with_capacity(10);

    checks.push(count_row(
        "Geometry Validity",
        geometry.validity.invalid_count,
        CheckStatus::Fail,
        Severity::High,
        "invalid geometries found",
        "All geometries valid",
    ));
    checks.push(count_row(
        "Empty Geometries",
        geometry.empty.empty_count,
        CheckStatus::Warn,
        Severity::Medium,
        "empty geometries found",
        "No empty geometries",
    ));
    checks.push(count_row(
        "Duplicate Geometries",
        geometry.duplicates.duplicate_count,
        CheckStatus::Warn,
        Severity::Medium,
        "duplicate geometries found",
        "No duplicate geometries",
    ));
    checks.push(match crs {
        Some(crs) => QualityCheck {
            check: "CRS Defined",
            status: CheckStatus::Pass,
            count: 1,
            severity: Severity::None,
            details: format!("CRS: {}", crs),
        },
        None => QualityCheck {
            check: "CRS Defined",
            status: CheckStatus::Fail,
            count: 0,
            severity: Severity::High,
            details: "No CRS defined".to_string(),
        },
    });
    checks.push(completeness_row(attributes));

    let mixed = geometry.types.mixed_types;
    checks.push(QualityCheck {
        check: "Homogeneous Geometry Types",
        status: if mixed { CheckStatus::Warn } else { CheckStatus::Pass },
        count: geometry.types.geometry_types.len() as i64,
        severity: if mixed { Severity::Low } else { Severity::None },
        details: if mixed {
            "Mixed geometry types detected".to_string()
        } else {
            "Single geometry type".to_string()
        },
    });

    checks.push(overlap_row(report));
    checks.push(count_row(
        "Ring Orientation",
        topology.rings.bad_ring_count,
        CheckStatus::Warn,
        Severity::Low,
        "polygons with clockwise exterior rings",
        "All exterior rings counter-clockwise",
    ));
    checks.push(count_row(
        "Coordinate Precision",
        topology.precision.excessive_precision_count,
        CheckStatus::Warn,
        Severity::Low,
        "geometries with excessive coordinate precision",
        "Coordinate precision within limits",
    ));
    checks.push(count_row(
        "Sliver Polygons",
        topology.slivers.sliver_count,
        CheckStatus::Warn,
        Severity::Low,
        "sliver polygons found",
        "No sliver polygons",
    ));

    checks
}
