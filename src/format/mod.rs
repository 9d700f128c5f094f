//! Result Formatter: reshapes ResultSets for presentation
//!
//! Pure transformations over a borrowed ResultSet; the Table Store is never
//! involved. Shape fitness is structural: the formatter inspects column
//! count and types, and rejects mismatches with `UnsupportedShape` without
//! touching the input.

use crate::error::{Result, VarejoError};
use crate::query::ResultSet;
use crate::types::{ColumnType, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target structural form for a ResultSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Ordered (period, value) pairs. Period columns precede one numeric
    /// measure; a (year, month) integer pair renders as `YYYY-MM`.
    TimeSeries,
    /// Ordered (key, value) pairs, optionally truncated.
    RankedList { limit: Option<usize> },
    /// (key, value, percentage) triples.
    PercentageBreakdown,
    /// (row key, column key) -> value grid over two categorical axes.
    PivotGrid,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimeSeries => "time_series",
            Self::RankedList { .. } => "ranked_list",
            Self::PercentageBreakdown => "percentage_breakdown",
            Self::PivotGrid => "pivot_grid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub key: String,
    pub value: f64,
    pub percentage: f64,
}

/// A dense two-axis grid. Keys are listed in first-appearance order; absent
/// cells were absent in the source rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotGrid {
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    pub cells: BTreeMap<(String, String), f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormattedResult {
    TimeSeries(Vec<TimePoint>),
    RankedList(Vec<RankEntry>),
    PercentageBreakdown(Vec<BreakdownEntry>),
    PivotGrid(PivotGrid),
}

/// Reformat a ResultSet into the requested shape.
pub fn format(rs: &ResultSet, shape: Shape) -> Result<FormattedResult> {
    match shape {
        Shape::TimeSeries => time_series(rs),
        Shape::RankedList { limit } => ranked_list(rs, limit),
        Shape::PercentageBreakdown => percentage_breakdown(rs),
        Shape::PivotGrid => pivot_grid(rs),
    }
}

fn unsupported(shape: Shape, reason: impl Into<String>) -> VarejoError {
    VarejoError::UnsupportedShape {
        shape: shape.name().to_string(),
        reason: reason.into(),
    }
}

fn is_numeric(t: ColumnType) -> bool {
    matches!(t, ColumnType::Integer | ColumnType::Float)
}

/// Axis/key columns carry identities, not measures; floats don't qualify.
fn is_key(t: ColumnType) -> bool {
    !matches!(t, ColumnType::Float)
}

fn key_string(value: &Value) -> String {
    value.to_string()
}

/// Join period components; a (year, month) integer pair becomes `YYYY-MM`.
fn period_string(cells: &[&Value]) -> String {
    if let [Value::Integer(year), Value::Integer(month)] = cells {
        return format!("{year}-{month:02}");
    }
    cells
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// The trailing measure column, required by every shape.
fn measure_column(rs: &ResultSet, shape: Shape) -> Result<usize> {
    let last = rs
        .columns
        .len()
        .checked_sub(1)
        .ok_or_else(|| unsupported(shape, "result set has no columns"))?;
    if !is_numeric(rs.columns[last].col_type) {
        return Err(unsupported(
            shape,
            format!("last column '{}' is not numeric", rs.columns[last].name),
        ));
    }
    Ok(last)
}

fn time_series(rs: &ResultSet) -> Result<FormattedResult> {
    let shape = Shape::TimeSeries;
    let measure = measure_column(rs, shape)?;
    if measure == 0 {
        return Err(unsupported(shape, "no period columns before the measure"));
    }
    for col in &rs.columns[..measure] {
        if !is_key(col.col_type) {
            return Err(unsupported(shape, format!("column '{}' cannot form a period", col.name)));
        }
    }

    let mut points = Vec::with_capacity(rs.rows.len());
    for row in &rs.rows {
        let Some(value) = row[measure].as_f64() else {
            continue;
        };
        let cells: Vec<&Value> = row[..measure].iter().collect();
        points.push(TimePoint {
            period: period_string(&cells),
            value,
        });
    }
    Ok(FormattedResult::TimeSeries(points))
}

fn ranked_list(rs: &ResultSet, limit: Option<usize>) -> Result<FormattedResult> {
    let shape = Shape::RankedList { limit };
    if rs.columns.len() != 2 {
        return Err(unsupported(shape, "expected exactly (key, value) columns"));
    }
    let measure = measure_column(rs, shape)?;
    if !is_key(rs.columns[0].col_type) {
        return Err(unsupported(shape, format!("column '{}' cannot be a key", rs.columns[0].name)));
    }

    let mut entries = Vec::with_capacity(rs.rows.len());
    for row in &rs.rows {
        let Some(value) = row[measure].as_f64() else {
            continue;
        };
        entries.push(RankEntry {
            key: key_string(&row[0]),
            value,
        });
    }
    if let Some(n) = limit {
        entries.truncate(n);
    }
    Ok(FormattedResult::RankedList(entries))
}

fn percentage_breakdown(rs: &ResultSet) -> Result<FormattedResult> {
    let shape = Shape::PercentageBreakdown;
    if rs.columns.len() != 3 {
        return Err(unsupported(shape, "expected (key, value, percentage) columns"));
    }
    let pct_col = &rs.columns[2];
    if !is_numeric(pct_col.col_type)
        || !(pct_col.name.contains("percentage") || pct_col.name.contains("pct"))
    {
        return Err(unsupported(
            shape,
            format!("column '{}' is not a percentage column", pct_col.name),
        ));
    }
    if !is_numeric(rs.columns[1].col_type) {
        return Err(unsupported(shape, format!("column '{}' is not numeric", rs.columns[1].name)));
    }
    if !is_key(rs.columns[0].col_type) {
        return Err(unsupported(shape, format!("column '{}' cannot be a key", rs.columns[0].name)));
    }

    let mut entries = Vec::with_capacity(rs.rows.len());
    for row in &rs.rows {
        let (Some(value), Some(percentage)) = (row[1].as_f64(), row[2].as_f64()) else {
            continue;
        };
        entries.push(BreakdownEntry {
            key: key_string(&row[0]),
            value,
            percentage,
        });
    }
    Ok(FormattedResult::PercentageBreakdown(entries))
}

fn pivot_grid(rs: &ResultSet) -> Result<FormattedResult> {
    let shape = Shape::PivotGrid;
    let measure = measure_column(rs, shape)?;
    if measure < 2 {
        return Err(unsupported(shape, "needs two categorical axes before the measure"));
    }
    for col in &rs.columns[..measure] {
        if !is_key(col.col_type) {
            return Err(unsupported(shape, format!("column '{}' cannot be an axis", col.name)));
        }
    }

    let mut row_keys: Vec<String> = Vec::new();
    let mut col_keys: Vec<String> = Vec::new();
    let mut cells = BTreeMap::new();
    for row in &rs.rows {
        let Some(value) = row[measure].as_f64() else {
            continue;
        };
        let row_key = key_string(&row[0]);
        let col_cells: Vec<&Value> = row[1..measure].iter().collect();
        let col_key = period_string(&col_cells);
        if !row_keys.contains(&row_key) {
            row_keys.push(row_key.clone());
        }
        if !col_keys.contains(&col_key) {
            col_keys.push(col_key.clone());
        }
        cells.insert((row_key, col_key), value);
    }
    Ok(FormattedResult::PivotGrid(PivotGrid {
        row_keys,
        col_keys,
        cells,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ColumnMeta;

    fn seasonality() -> ResultSet {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("order_year", ColumnType::Integer),
            ColumnMeta::new("order_month", ColumnType::Integer),
            ColumnMeta::new("total_orders", ColumnType::Integer),
        ]);
        rs.push_row(vec![Value::Integer(2017), Value::Integer(3), Value::Integer(10)]);
        rs.push_row(vec![Value::Integer(2017), Value::Integer(11), Value::Integer(25)]);
        rs
    }

    fn breakdown() -> ResultSet {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("order_status", ColumnType::Text),
            ColumnMeta::new("order_count", ColumnType::Integer),
            ColumnMeta::new("percentage", ColumnType::Float),
        ]);
        rs.push_row(vec![
            Value::Text("delivered".into()),
            Value::Integer(3),
            Value::Float(75.0),
        ]);
        rs.push_row(vec![
            Value::Text("canceled".into()),
            Value::Integer(1),
            Value::Float(25.0),
        ]);
        rs
    }

    #[test]
    fn test_time_series_pads_months() {
        let out = format(&seasonality(), Shape::TimeSeries).unwrap();
        let FormattedResult::TimeSeries(points) = out else {
            panic!("wrong variant")
        };
        assert_eq!(points[0].period, "2017-03");
        assert_eq!(points[1].period, "2017-11");
        assert_eq!(points[1].value, 25.0);
    }

    #[test]
    fn test_ranked_list_truncates() {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("customer_state", ColumnType::Text),
            ColumnMeta::new("avg_freight_value", ColumnType::Float),
        ]);
        for (state, v) in [("SP", 9.0), ("RJ", 8.0), ("MG", 7.0)] {
            rs.push_row(vec![Value::Text(state.into()), Value::Float(v)]);
        }
        let out = format(&rs, Shape::RankedList { limit: Some(2) }).unwrap();
        let FormattedResult::RankedList(entries) = out else {
            panic!("wrong variant")
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "SP");
    }

    #[test]
    fn test_percentage_breakdown() {
        let out = format(&breakdown(), Shape::PercentageBreakdown).unwrap();
        let FormattedResult::PercentageBreakdown(entries) = out else {
            panic!("wrong variant")
        };
        assert_eq!(entries[0].key, "delivered");
        assert_eq!(entries[0].percentage, 75.0);
    }

    #[test]
    fn test_pivot_grid_from_state_month_counts() {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("customer_state", ColumnType::Text),
            ColumnMeta::new("order_year", ColumnType::Integer),
            ColumnMeta::new("order_month", ColumnType::Integer),
            ColumnMeta::new("total_orders", ColumnType::Integer),
        ]);
        rs.push_row(vec![
            Value::Text("SP".into()),
            Value::Integer(2017),
            Value::Integer(3),
            Value::Integer(4),
        ]);
        rs.push_row(vec![
            Value::Text("RJ".into()),
            Value::Integer(2017),
            Value::Integer(3),
            Value::Integer(2),
        ]);
        let out = format(&rs, Shape::PivotGrid).unwrap();
        let FormattedResult::PivotGrid(grid) = out else {
            panic!("wrong variant")
        };
        assert_eq!(grid.row_keys, vec!["SP", "RJ"]);
        assert_eq!(grid.col_keys, vec!["2017-03"]);
        assert_eq!(grid.cells[&("SP".to_string(), "2017-03".to_string())], 4.0);
    }

    #[test]
    fn test_shape_mismatch_rejected_and_input_unchanged() {
        let rs = breakdown();
        let before = rs.clone();

        // Only one categorical axis before the measure-like columns.
        let mut two_col = ResultSet::new(vec![
            ColumnMeta::new("k", ColumnType::Text),
            ColumnMeta::new("v", ColumnType::Integer),
        ]);
        two_col.push_row(vec![Value::Text("a".into()), Value::Integer(1)]);
        assert!(matches!(
            format(&two_col, Shape::PivotGrid).unwrap_err(),
            VarejoError::UnsupportedShape { .. }
        ));

        // Breakdown has three columns, not two.
        assert!(format(&rs, Shape::RankedList { limit: None }).is_err());
        // Value column name does not mark a percentage.
        let mut not_pct = ResultSet::new(vec![
            ColumnMeta::new("k", ColumnType::Text),
            ColumnMeta::new("a", ColumnType::Integer),
            ColumnMeta::new("b", ColumnType::Integer),
        ]);
        not_pct.push_row(vec![Value::Text("x".into()), Value::Integer(1), Value::Integer(2)]);
        assert!(format(&not_pct, Shape::PercentageBreakdown).is_err());

        assert_eq!(rs, before);
    }

    #[test]
    fn test_null_measures_are_skipped() {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("order_year", ColumnType::Integer),
            ColumnMeta::new("yoy_growth_pct", ColumnType::Float).nullable(),
        ]);
        rs.push_row(vec![Value::Integer(2016), Value::Null]);
        rs.push_row(vec![Value::Integer(2017), Value::Float(50.0)]);
        let out = format(&rs, Shape::TimeSeries).unwrap();
        let FormattedResult::TimeSeries(points) = out else {
            panic!("wrong variant")
        };
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].period, "2017");
    }
}
