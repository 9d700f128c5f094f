//! Query execution layer: result sets, the executor, the result cache and
//! the window-style aggregation helpers

pub mod cache;
mod executor;
mod result;
pub mod window;

pub use cache::{CacheStats, ResultCache};
pub use executor::Executor;
pub use result::{ColumnMeta, ResultSet};
