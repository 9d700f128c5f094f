//! Error types for the varejo query layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VarejoError>;

#[derive(Error, Debug)]
pub enum VarejoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Source file missing or malformed at startup. Fatal to the load.
    #[error("failed to load table '{table}': {reason}")]
    Load { table: String, reason: String },

    /// A relation was requested from the store but never loaded.
    #[error("relation not loaded: {0}")]
    NotFound(String),

    /// A catalog query depends on a relation absent from the store.
    #[error("query '{query}' requires relation '{relation}', which is not loaded")]
    UnresolvedRelation { query: String, relation: String },

    #[error("invalid parameter '{name}' for query '{query}': {reason}")]
    InvalidParameter {
        query: String,
        name: String,
        reason: String,
    },

    #[error("unknown query id: {0}")]
    UnknownQuery(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Unexpected failure during aggregation. Carries the query id and the
    /// parameters it ran with; the computation is deterministic, so there is
    /// no point retrying.
    #[error("query '{query}' failed (params: {params}): {reason}")]
    Execution {
        query: String,
        params: String,
        reason: String,
    },

    #[error("shape '{shape}' does not fit this result set: {reason}")]
    UnsupportedShape { shape: String, reason: String },
}
