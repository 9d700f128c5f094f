//! Query executor: resolves catalog entries and runs them against a store

use crate::catalog::{self, params, Params, QueryId};
use crate::error::{Result, VarejoError};
use crate::query::cache::{CacheStats, ResultCache};
use crate::query::ResultSet;
use crate::store::TableStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Runs named catalog queries against a loaded Table Store.
///
/// Results are shared `Arc`s out of an LRU cache; the store is immutable
/// after load, so cached entries stay valid for the executor's lifetime.
pub struct Executor<'a> {
    store: &'a TableStore,
    cache: ResultCache,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a TableStore) -> Self {
        Self {
            store,
            cache: ResultCache::default(),
        }
    }

    pub fn with_cache_capacity(store: &'a TableStore, capacity: usize) -> Self {
        Self {
            store,
            cache: ResultCache::new(capacity),
        }
    }

    pub fn store(&self) -> &TableStore {
        self.store
    }

    /// Run a catalog query.
    ///
    /// Validates parameters against the declared schema, checks that every
    /// required relation is loaded, and wraps unexpected aggregation
    /// failures with the query id and parameters. Per-query failures leave
    /// the store and the cache untouched.
    pub fn run(&self, id: QueryId, params: &Params) -> Result<Arc<ResultSet>> {
        let def = catalog::lookup(id);
        let resolved = params::validate(id.as_str(), def.params, params)?;

        for relation in def.relations {
            if !self.store.contains(relation) {
                return Err(VarejoError::UnresolvedRelation {
                    query: id.as_str().to_string(),
                    relation: relation.to_string(),
                });
            }
        }

        let key = format!("{id}?{resolved}");
        if let Some(hit) = self.cache.get(&key) {
            trace!(query = %id, "cache hit");
            return Ok(hit);
        }

        let start = Instant::now();
        let result = (def.run)(self.store, &resolved).map_err(|e| match e {
            e @ (VarejoError::InvalidParameter { .. } | VarejoError::UnresolvedRelation { .. }) => e,
            other => VarejoError::Execution {
                query: id.as_str().to_string(),
                params: resolved.to_string(),
                reason: other.to_string(),
            },
        })?;
        debug!(
            query = %id,
            rows = result.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "query executed"
        );

        let result = Arc::new(result);
        self.cache.put(key, Arc::clone(&result));
        Ok(result)
    }

    /// Run a query addressed by its string id, e.g. from a CLI or HTTP
    /// surface.
    pub fn run_named(&self, name: &str, params: &Params) -> Result<Arc<ResultSet>> {
        self.run(name.parse()?, params)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Relation;
    use crate::types::{ColumnDef, ColumnType, TableSchema, Timestamp, Value};

    fn orders_store() -> TableStore {
        let schema = TableSchema::new(
            "orders",
            vec![
                ColumnDef::new("order_id", ColumnType::Text, 0).not_null(),
                ColumnDef::new("customer_id", ColumnType::Text, 1).not_null(),
                ColumnDef::new("order_status", ColumnType::Text, 2).not_null(),
                ColumnDef::new("order_purchase_timestamp", ColumnType::Timestamp, 3).not_null(),
                ColumnDef::new("order_delivered_customer_date", ColumnType::Timestamp, 4),
                ColumnDef::new("order_estimated_delivery_date", ColumnType::Timestamp, 5),
            ],
        );
        let ts = |s: &str| Value::Timestamp(Timestamp::parse(s).unwrap());
        let rows = vec![
            vec![
                Value::Text("o1".into()),
                Value::Text("c1".into()),
                Value::Text("delivered".into()),
                ts("2017-03-01 08:00:00"),
                Value::Null,
                Value::Null,
            ],
            vec![
                Value::Text("o2".into()),
                Value::Text("c2".into()),
                Value::Text("delivered".into()),
                ts("2018-03-01 20:00:00"),
                Value::Null,
                Value::Null,
            ],
        ];
        let mut store = TableStore::new();
        store.insert(Relation::new(schema, rows));
        store
    }

    #[test]
    fn test_missing_relation_is_unresolved() {
        let store = TableStore::new();
        let exec = Executor::new(&store);
        let err = exec.run(QueryId::OrdersYoyGrowth, &Params::new()).unwrap_err();
        assert!(matches!(err, VarejoError::UnresolvedRelation { .. }));
        assert!(err.to_string().contains("orders"));
    }

    #[test]
    fn test_invalid_parameter_rejected() {
        let store = orders_store();
        let exec = Executor::new(&store);
        let err = exec
            .run(QueryId::OrdersYoyGrowth, &Params::new().with("limit", 5))
            .unwrap_err();
        assert!(matches!(err, VarejoError::InvalidParameter { .. }));
    }

    #[test]
    fn test_unknown_name_rejected() {
        let store = orders_store();
        let exec = Executor::new(&store);
        assert!(matches!(
            exec.run_named("nope", &Params::new()).unwrap_err(),
            VarejoError::UnknownQuery(_)
        ));
    }

    #[test]
    fn test_repeat_run_hits_cache() {
        let store = orders_store();
        let exec = Executor::new(&store);
        let first = exec.run(QueryId::OrdersYoyGrowth, &Params::new()).unwrap();
        let second = exec.run(QueryId::OrdersYoyGrowth, &Params::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = exec.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_distinct_queries_get_distinct_cache_entries() {
        let store = orders_store();
        let exec = Executor::new(&store);
        let a = exec.run(QueryId::TimeOfDayDistribution, &Params::new()).unwrap();
        let b = exec.run(QueryId::OrdersTimeRange, &Params::new()).unwrap();
        assert_ne!(a.columns, b.columns);
        assert_eq!(exec.cache_stats().misses, 2);
    }
}
