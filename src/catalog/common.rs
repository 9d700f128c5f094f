//! Join helpers shared by the catalog queries

use crate::error::Result;
use crate::store::TableStore;
use ahash::AHashMap;

/// customer_id -> customer_state, from the customers relation.
pub(crate) fn customer_state_map(store: &TableStore) -> Result<AHashMap<String, String>> {
    let customers = store.get("customers")?;
    let id = customers.col("customer_id")?;
    let state = customers.col("customer_state")?;

    let mut map = AHashMap::with_capacity(customers.len());
    for row in customers.rows() {
        if let (Some(id), Some(state)) = (row[id].as_str(), row[state].as_str()) {
            map.insert(id.to_string(), state.to_string());
        }
    }
    Ok(map)
}

/// order_id -> customer_state, the inner join of orders with customers.
/// Orders whose customer is unknown drop out, matching INNER JOIN semantics.
pub(crate) fn order_state_map(store: &TableStore) -> Result<AHashMap<String, String>> {
    let by_customer = customer_state_map(store)?;
    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let customer_id = orders.col("customer_id")?;

    let mut map = AHashMap::with_capacity(orders.len());
    for row in orders.rows() {
        let (Some(oid), Some(cid)) = (row[order_id].as_str(), row[customer_id].as_str()) else {
            continue;
        };
        if let Some(state) = by_customer.get(cid) {
            map.insert(oid.to_string(), state.clone());
        }
    }
    Ok(map)
}
