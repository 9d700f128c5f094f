//! Table Store: the eight dataset relations, resident for the process lifetime
//!
//! The store is an explicitly constructed context object. Tests build
//! isolated fixtures with [`TableStore::insert`]; production code loads the
//! full dataset once through [`TableStore::load_dataset`]. There is no write
//! path after load, so sharing a store between readers needs no locking.

pub mod dataset;
pub mod loader;
mod relation;

pub use loader::ParseMode;
pub use relation::Relation;

use crate::config::DatasetConfig;
use crate::error::{Result, VarejoError};
use ahash::AHashMap;
use tracing::info;

/// Holds the loaded relations, keyed by table name.
#[derive(Debug, Default)]
pub struct TableStore {
    tables: AHashMap<String, Relation>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every dataset table from its CSV source. Fails fast on the first
    /// missing or malformed file.
    pub fn load_dataset(config: &DatasetConfig) -> Result<Self> {
        let mut store = Self::new();
        for table in dataset::TABLE_NAMES {
            store.load(table, &config.path_for(table))?;
        }
        info!(tables = store.tables.len(), "dataset loaded");
        Ok(store)
    }

    /// Load one named table from a CSV source file.
    pub fn load(&mut self, table: &str, source: &std::path::Path) -> Result<()> {
        let schema = dataset::schema(table).ok_or_else(|| VarejoError::Load {
            table: table.to_string(),
            reason: "not a dataset table".to_string(),
        })?;
        let mode = if dataset::lenient(table) {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        };
        let relation = loader::load_file(&schema, source, mode)?;
        info!(table, rows = relation.len(), "table loaded");
        self.tables.insert(table.to_string(), relation);
        Ok(())
    }

    /// Register a pre-built relation. Fixture entry point for tests.
    pub fn insert(&mut self, relation: Relation) {
        self.tables.insert(relation.name().to_string(), relation);
    }

    /// Fetch a loaded relation by name.
    pub fn get(&self, table: &str) -> Result<&Relation> {
        self.tables
            .get(table)
            .ok_or_else(|| VarejoError::NotFound(table.to_string()))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Loaded table names, sorted for stable display.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
