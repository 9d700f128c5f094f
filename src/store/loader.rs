//! CSV ingestion for dataset relations

use crate::error::{Result, VarejoError};
use crate::store::Relation;
use crate::types::{ColumnType, TableSchema, Timestamp, Value};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// How to treat rows that fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Any malformed required field fails the whole load.
    Strict,
    /// Malformed rows are skipped with a warning. Used for source files with
    /// known encoding defects (the reviews CSV).
    Lenient,
}

/// Load one relation from a CSV file on disk.
pub fn load_file(schema: &TableSchema, path: &Path, mode: ParseMode) -> Result<Relation> {
    let file = std::fs::File::open(path).map_err(|e| VarejoError::Load {
        table: schema.name.clone(),
        reason: format!("{}: {e}", path.display()),
    })?;
    load_reader(schema, file, mode)
}

/// Load one relation from any CSV reader.
///
/// Header resolution is by name: the file may carry extra columns or a
/// different column order, but every schema column must be present. Empty
/// fields in nullable columns become Null; empty fields in required columns
/// are malformed.
pub fn load_reader<R: Read>(schema: &TableSchema, reader: R, mode: ParseMode) -> Result<Relation> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers().map_err(|e| load_err(schema, e))?.clone();
    let mut positions = Vec::with_capacity(schema.columns.len());
    for col in &schema.columns {
        match headers.iter().position(|h| h.trim() == col.name) {
            Some(idx) => positions.push(idx),
            None => {
                return Err(VarejoError::Load {
                    table: schema.name.clone(),
                    reason: format!("missing column '{}' in header", col.name),
                })
            }
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in csv.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => match mode {
                ParseMode::Strict => return Err(load_err(schema, e)),
                ParseMode::Lenient => {
                    skipped += 1;
                    continue;
                }
            },
        };

        match parse_row(schema, &positions, &record) {
            Ok(row) => rows.push(row),
            Err(reason) => match mode {
                ParseMode::Strict => {
                    return Err(VarejoError::Load {
                        table: schema.name.clone(),
                        reason: format!("row {}: {reason}", line + 2),
                    })
                }
                ParseMode::Lenient => {
                    warn!(table = %schema.name, line = line + 2, %reason, "skipping malformed row");
                    skipped += 1;
                }
            },
        }
    }

    debug!(table = %schema.name, rows = rows.len(), skipped, "loaded relation");
    Ok(Relation::new(schema.clone(), rows))
}

fn parse_row(
    schema: &TableSchema,
    positions: &[usize],
    record: &csv::StringRecord,
) -> std::result::Result<Vec<Value>, String> {
    let mut row = Vec::with_capacity(schema.columns.len());
    for (col, &pos) in schema.columns.iter().zip(positions) {
        let raw = record.get(pos).unwrap_or("").trim();
        if raw.is_empty() {
            if col.nullable {
                row.push(Value::Null);
                continue;
            }
            return Err(format!("required column '{}' is empty", col.name));
        }
        let value = match col.col_type {
            ColumnType::Integer => raw
                .parse::<i64>()
                .ok()
                // Some numeric CSV columns are written as "1.0"
                .or_else(|| raw.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Value::Integer),
            ColumnType::Float => raw.parse::<f64>().ok().map(Value::Float),
            ColumnType::Text => Some(Value::Text(raw.to_string())),
            ColumnType::Timestamp => Timestamp::parse(raw).map(Value::Timestamp),
        };
        match value {
            Some(v) => row.push(v),
            None => return Err(format!("column '{}': cannot parse '{raw}'", col.name)),
        }
    }
    Ok(row)
}

fn load_err(schema: &TableSchema, e: csv::Error) -> VarejoError {
    VarejoError::Load {
        table: schema.name.clone(),
        reason: e.to_string(),
    }
}
