/// Relation metadata and schema definitions
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Integer
    Integer,
    /// Float
    Float,
    /// Text/String
    Text,
    /// Calendar timestamp
    Timestamp,
}

/// Column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Column data type
    pub col_type: ColumnType,
    /// Position in Row (0-indexed)
    pub position: usize,
    /// Whether this column is nullable
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, col_type: ColumnType, position: usize) -> Self {
        Self {
            name: name.into(),
            col_type,
            position,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Relation schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Relation name
    pub name: String,
    /// Column definitions (ordered)
    pub columns: Vec<ColumnDef>,
    /// Column name -> position mapping
    #[serde(skip)]
    column_map: AHashMap<String, usize>,
}

impl TableSchema {
    /// Create a new relation schema
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        let mut schema = Self {
            name: name.into(),
            columns,
            column_map: AHashMap::new(),
        };
        schema.rebuild_column_map();
        schema
    }

    /// Rebuild the name -> position map (needed after deserialization)
    pub fn rebuild_column_map(&mut self) {
        self.column_map = self
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.position))
            .collect();
    }

    /// Look up a column position by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.column_index(name).and_then(|i| self.columns.get(i))
    }
}
