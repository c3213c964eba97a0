//! Attribute completeness and column types.
//!
//! Columns are the union of property keys across all features. A cell is null
//! when the key is missing from a feature or holds JSON `null`. A column's
//! dtype is inferred from its non-null JSON values; numeric columns also get
//! summary statistics.

use crate::dataset::Properties;
use crate::error::{ProfileError, Result};
use crate::spatial::{quantile, round_to};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Null statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub null_count: usize,
    pub non_null_count: usize,
    pub unique_count: usize,
    /// Percentage of rows with a value, rounded to 0.1.
    pub completeness: f64,
    pub dtype: Dtype,
    /// Present for `integer` and `float` columns.
    pub numeric: Option<NumericStats>,
}

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Integer,
    Float,
    Boolean,
    String,
    Object,
    Mixed,
    /// Every cell is null.
    Null,
}

impl Dtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Integer => "integer",
            Dtype::Float => "float",
            Dtype::Boolean => "boolean",
            Dtype::String => "string",
            Dtype::Object => "object",
            Dtype::Mixed => "mixed",
            Dtype::Null => "null",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Dtype::Integer | Dtype::Float)
    }

    fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Dtype::Null,
            Value::Bool(_) => Dtype::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Dtype::Integer,
            Value::Number(_) => Dtype::Float,
            Value::String(_) => Dtype::String,
            Value::Array(_) | Value::Object(_) => Dtype::Object,
        }
    }

    /// Widen with another value's type. Integer and float widen to float.
    fn merge(self, other: Dtype) -> Self {
        match (self, other) {
            (Dtype::Null, t) | (t, Dtype::Null) => t,
            (a, b) if a == b => a,
            (Dtype::Integer, Dtype::Float) | (Dtype::Float, Dtype::Integer) => Dtype::Float,
            _ => Dtype::Mixed,
        }
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics of a numeric column, rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub zeros: usize,
    pub negatives: usize,
}

impl NumericStats {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            round_to(var.sqrt(), 4)
        });
        Some(NumericStats {
            mean: round_to(mean, 4),
            median: round_to(quantile(&values, 0.5), 4),
            std,
            min: round_to(values[0], 4),
            max: round_to(values[n - 1], 4),
            q25: round_to(quantile(&values, 0.25), 4),
            q75: round_to(quantile(&values, 0.75), 4),
            zeros: values.iter().filter(|v| **v == 0.0).count(),
            negatives: values.iter().filter(|v| **v < 0.0).count(),
        })
    }
}

/// Completeness over every attribute column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeReport {
    pub row_count: usize,
    pub columns: BTreeMap<String, ColumnStats>,
    pub total_nulls: usize,
}

impl AttributeReport {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells considered for completeness; 1 when there are no columns.
    pub fn total_cells(&self) -> usize {
        if self.columns.is_empty() {
            1
        } else {
            self.row_count * self.columns.len()
        }
    }

    /// Fraction of non-null cells, `1.0` for a dataset without cells.
    pub fn completeness(&self) -> f64 {
        match self.total_cells() {
            0 => 1.0,
            cells => 1.0 - self.total_nulls as f64 / cells as f64,
        }
    }

    /// Percentage of null cells.
    pub fn null_percentage(&self) -> f64 {
        match self.total_cells() {
            0 => 0.0,
            cells => self.total_nulls as f64 / cells as f64 * 100.0,
        }
    }

    /// Per-column completeness percentages.
    pub fn column_completeness(&self) -> BTreeMap<String, f64> {
        self.columns
            .iter()
            .map(|(name, stats)| (name.clone(), stats.completeness))
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&ColumnStats> {
        self.columns.get(name).ok_or_else(|| ProfileError::ColumnNotFound {
            name: name.to_string(),
            available: self.columns.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    /// Null count of one column.
    pub fn column_nulls(&self, name: &str) -> Result<usize> {
        self.column(name).map(|c| c.null_count)
    }

    /// Column name → dtype name.
    pub fn column_dtypes(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|(name, stats)| (name.clone(), stats.dtype.to_string()))
            .collect()
    }

    /// Names of the numeric columns.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .values()
            .filter(|c| c.dtype.is_numeric())
            .map(|c| c.name.as_str())
    }
}

/// Compute attribute completeness for a set of rows.
pub fn profile_attributes(rows: &[Properties]) -> AttributeReport {
    let names: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
    let row_count = rows.len();

    let mut columns = BTreeMap::new();
    let mut total_nulls = 0;
    for name in names {
        let mut null_count = 0;
        let mut distinct = BTreeSet::new();
        let mut dtype = Dtype::Null;
        let mut numbers = Vec::new();
        for row in rows {
            match row.get(name.as_str()) {
                None | Some(Value::Null) => null_count += 1,
                Some(value) => {
                    dtype = dtype.merge(Dtype::of_value(value));
                    if let Some(n) = value.as_f64() {
                        numbers.push(n);
                    }
                    distinct.insert(value.to_string());
                }
            }
        }
        total_nulls += null_count;
        let numeric = if dtype.is_numeric() {
            NumericStats::from_values(numbers)
        } else {
            None
        };

        let completeness = if row_count > 0 {
            ((row_count - null_count) as f64 / row_count as f64 * 1000.0).round() / 10.0
        } else {
            100.0
        };
        columns.insert(
            name.clone(),
            ColumnStats {
                name: name.clone(),
                null_count,
                non_null_count: row_count - null_count,
                unique_count: distinct.len(),
                completeness,
                dtype,
                numeric,
            },
        );
    }

    AttributeReport {
        row_count,
        columns,
        total_nulls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Properties> {
        [
            json!({"name": "a", "height": 10}),
            json!({"name": null, "height": 12}),
            json!({"height": 10}),
            json!({"name": "d", "height": null, "use": "shop"}),
        ]
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        })
        .collect()
    }

    #[test]
    fn test_null_counts() {
        let report = profile_attributes(&rows());
        assert_eq!(report.column_count(), 3);
        assert_eq!(report.column_nulls("name").unwrap(), 2);
        assert_eq!(report.column_nulls("height").unwrap(), 1);
        assert_eq!(report.column_nulls("use").unwrap(), 3);
        assert_eq!(report.total_nulls, 6);
        assert_eq!(report.total_cells(), 12);
        assert!((report.completeness() - 0.5).abs() < 1e-12);
        assert_eq!(report.column("height").unwrap().unique_count, 2);
        assert_eq!(report.column("name").unwrap().completeness, 50.0);
    }

    #[test]
    fn test_unknown_column() {
        let report = profile_attributes(&rows());
        let err = report.column_nulls("missing").unwrap_err();
        assert!(matches!(err, ProfileError::ColumnNotFound { ref name, .. } if name == "missing"));
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn test_column_dtypes() {
        let rows: Vec<Properties> = [
            json!({"n": 1, "x": 1, "flag": true, "tag": "a", "mix": 1, "gone": null}),
            json!({"n": 2, "x": 2.5, "flag": false, "tag": "b", "mix": "one"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        let report = profile_attributes(&rows);
        let dtypes = report.column_dtypes();
        assert_eq!(dtypes["n"], "integer");
        assert_eq!(dtypes["x"], "float");
        assert_eq!(dtypes["flag"], "boolean");
        assert_eq!(dtypes["tag"], "string");
        assert_eq!(dtypes["mix"], "mixed");
        assert_eq!(dtypes["gone"], "null");
        assert_eq!(report.numeric_columns().collect::<Vec<_>>(), vec!["n", "x"]);
        assert!(report.column("mix").unwrap().numeric.is_none());
    }

    #[test]
    fn test_numeric_stats() {
        let rows: Vec<Properties> = [-2, 0, 0, 4, 8]
            .into_iter()
            .filter_map(|v| json!({ "depth": v }).as_object().cloned())
            .chain(std::iter::once(Properties::new()))
            .collect();
        let report = profile_attributes(&rows);
        let stats = report.column("depth").unwrap().numeric.clone().unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!((stats.min, stats.max), (-2.0, 8.0));
        assert_eq!((stats.q25, stats.q75), (0.0, 4.0));
        assert_eq!(stats.zeros, 2);
        assert_eq!(stats.negatives, 1);
        assert_eq!(stats.std, Some(4.0));
    }

    #[test]
    fn test_no_columns_is_complete() {
        let report = profile_attributes(&[Properties::new(), Properties::new()]);
        assert_eq!(report.column_count(), 0);
        assert_eq!(report.total_cells(), 1);
        assert_eq!(report.completeness(), 1.0);
    }
}
