//! Tabular query results

use crate::types::{ColumnType, Row, Value};
use serde::{Deserialize, Serialize};

/// Result column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// The output of one catalog query: ordered rows plus column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        static NULL: Value = Value::Null;
        match self.column_index(name) {
            Some(col) => self
                .rows
                .iter()
                .map(|r| r.get(col).unwrap_or(&NULL))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lookup() {
        let mut rs = ResultSet::new(vec![
            ColumnMeta::new("state", ColumnType::Text),
            ColumnMeta::new("total", ColumnType::Integer),
        ]);
        rs.push_row(vec![Value::Text("SP".into()), Value::Integer(42)]);

        assert_eq!(rs.value(0, "total"), Some(&Value::Integer(42)));
        assert_eq!(rs.value(0, "missing"), None);
        assert_eq!(rs.value(1, "total"), None);
        assert_eq!(rs.column_values("state"), vec![&Value::Text("SP".into())]);
    }
}
