//! Dataset configuration
//!
//! Maps logical table names to their CSV source files under a data
//! directory. Defaults mirror the published dataset's file names; individual
//! files can be remapped for fixtures or renamed exports.

use crate::store::dataset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding the eight CSV files.
    pub data_dir: PathBuf,
    /// Table name -> file name overrides. Tables absent here use the
    /// dataset's default file names.
    pub files: BTreeMap<String, String>,
}

impl DatasetConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Override the source file for one table.
    pub fn with_file(mut self, table: impl Into<String>, file: impl Into<String>) -> Self {
        self.files.insert(table.into(), file.into());
        self
    }

    /// Full path of the CSV backing a table.
    pub fn path_for(&self, table: &str) -> PathBuf {
        let file = self
            .files
            .get(table)
            .map(String::as_str)
            .or_else(|| dataset::default_file(table))
            .unwrap_or(table);
        Path::new(&self.data_dir).join(file)
    }
}
