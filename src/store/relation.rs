//! In-memory relation: a fixed schema plus loaded rows

use crate::error::{Result, VarejoError};
use crate::types::{Row, TableSchema, Value};
use serde::{Deserialize, Serialize};

/// An immutable in-memory table of rows with a named, typed column schema.
///
/// Relations are built once by the loader (or by test fixtures) and never
/// mutated afterwards; every accessor is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    schema: TableSchema,
    rows: Vec<Row>,
}

impl Relation {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name to its row position.
    pub fn col(&self, name: &str) -> Result<usize> {
        self.schema
            .column_index(name)
            .ok_or_else(|| VarejoError::ColumnNotFound(format!("{}.{}", self.schema.name, name)))
    }

    /// Cell accessor; out-of-range positions read as Null.
    pub fn value<'a>(&'a self, row: &'a Row, col: usize) -> &'a Value {
        static NULL: Value = Value::Null;
        row.get(col).unwrap_or(&NULL)
    }
}
