//! CSV export and re-import of query results
//!
//! `write_csv` emits a header row followed by one record per result row;
//! nulls become empty fields. `read_csv` reverses it, inferring each
//! column's type from the values it actually holds, so a written ResultSet
//! reads back with the same column names and values.

use crate::error::{Result, VarejoError};
use crate::query::{ColumnMeta, ResultSet};
use crate::types::{ColumnType, Row, Timestamp, Value};
use std::io::{Read, Write};
use std::path::Path;

/// Write a ResultSet as CSV: header first, then rows in order.
pub fn write_csv<W: Write>(rs: &ResultSet, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(rs.columns.iter().map(|c| c.name.as_str()))?;
    for row in &rs.rows {
        out.write_record(row.iter().map(|v| v.to_string()))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file(rs: &ResultSet, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(rs, file)
}

/// Render a ResultSet to an in-memory CSV string, for download handlers.
pub fn to_csv_string(rs: &ResultSet) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(rs, &mut buf)?;
    String::from_utf8(buf).map_err(|e| VarejoError::Execution {
        query: "export".to_string(),
        params: String::new(),
        reason: e.to_string(),
    })
}

/// Read a CSV produced by `write_csv` back into a ResultSet.
///
/// Column types are inferred per column: all-integer fields come back as
/// Integer, all-float as Float, all-timestamp as Timestamp, anything else
/// as Text. Empty fields come back as Null and mark the column nullable.
///
/// Inference sees only the written text. A Text column whose every value
/// happens to be numeric (ids, zip code prefixes) therefore revives as a
/// numeric column; values round-trip, the original column type does not.
pub fn read_csv<R: Read>(reader: R) -> Result<ResultSet> {
    let mut input = csv::Reader::from_reader(reader);
    let names: Vec<String> = input
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in input.records() {
        let record = record?;
        records.push(record.iter().map(|f| f.to_string()).collect());
    }

    let mut columns = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let fields = records.iter().map(|r| r[idx].as_str());
        let (col_type, nullable) = infer_column(fields);
        let mut meta = ColumnMeta::new(name.clone(), col_type);
        if nullable {
            meta = meta.nullable();
        }
        columns.push(meta);
    }

    let mut rs = ResultSet::new(columns);
    for record in &records {
        let mut row: Row = Vec::with_capacity(record.len());
        for (idx, field) in record.iter().enumerate() {
            row.push(revive(field, rs.columns[idx].col_type));
        }
        rs.push_row(row);
    }
    Ok(rs)
}

pub fn read_csv_file(path: impl AsRef<Path>) -> Result<ResultSet> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Pick the narrowest type every non-empty field of a column fits.
fn infer_column<'a>(fields: impl Iterator<Item = &'a str>) -> (ColumnType, bool) {
    let mut nullable = false;
    let mut seen = false;
    let mut integer = true;
    let mut float = true;
    let mut timestamp = true;
    for field in fields {
        if field.is_empty() {
            nullable = true;
            continue;
        }
        seen = true;
        integer = integer && field.parse::<i64>().is_ok();
        float = float && field.parse::<f64>().is_ok();
        timestamp = timestamp && Timestamp::parse(field).is_some();
    }
    let col_type = if !seen {
        ColumnType::Text
    } else if integer {
        ColumnType::Integer
    } else if float {
        ColumnType::Float
    } else if timestamp {
        ColumnType::Timestamp
    } else {
        ColumnType::Text
    };
    (col_type, nullable)
}

fn revive(field: &str, col_type: ColumnType) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    match col_type {
        ColumnType::Integer => field
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnType::Float => field
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnType::Timestamp => Timestamp::parse(field)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::Text(field.to_string())),
        ColumnType::Text => Value::Text(field.to_string()),
    }
}
