//! Customer geography queries

use crate::catalog::common::customer_state_map;
use crate::catalog::params::Params;
use crate::error::Result;
use crate::query::window::percentage_of_total;
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Value};
use ahash::AHashSet;
use std::collections::BTreeMap;

/// Customer counts per state with percentage of total, largest state first.
pub(crate) fn customer_distribution_by_state(
    store: &TableStore,
    _params: &Params,
) -> Result<ResultSet> {
    let customers = store.get("customers")?;
    let id = customers.col("customer_id")?;
    let state = customers.col("customer_state")?;

    // customer_id is unique, so distinct customers per state is a set count.
    let mut by_state: BTreeMap<String, AHashSet<&str>> = BTreeMap::new();
    for row in customers.rows() {
        let (Some(cid), Some(state)) = (row[id].as_str(), row[state].as_str()) else {
            continue;
        };
        by_state.entry(state.to_string()).or_default().insert(cid);
    }

    let values: Vec<f64> = by_state.values().map(|s| s.len() as f64).collect();
    let percentages = percentage_of_total(&values);

    let mut entries: Vec<(String, i64, f64)> = by_state
        .into_iter()
        .zip(percentages)
        .map(|((state, ids), pct)| (state, ids.len() as i64, pct))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("customer_state", ColumnType::Text),
        ColumnMeta::new("total_customers", ColumnType::Integer),
        ColumnMeta::new("percentage", ColumnType::Float),
    ]);
    for (state, count, pct) in entries {
        rs.push_row(vec![
            Value::Text(state),
            Value::Integer(count),
            Value::Float(pct),
        ]);
    }
    Ok(rs)
}

/// Order counts per (state, year, month). The pivot-grid feed for the
/// month-on-month geography view.
pub(crate) fn month_on_month_orders_by_state(
    store: &TableStore,
    _params: &Params,
) -> Result<ResultSet> {
    let by_customer = customer_state_map(store)?;
    let orders = store.get("orders")?;
    let customer_id = orders.col("customer_id")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut groups: BTreeMap<(String, i32, u32), i64> = BTreeMap::new();
    for row in orders.rows() {
        let (Some(cid), Some(ts)) = (row[customer_id].as_str(), row[purchase].as_timestamp())
        else {
            continue;
        };
        let Some(state) = by_customer.get(cid) else {
            continue;
        };
        *groups
            .entry((state.clone(), ts.year(), ts.month()))
            .or_insert(0) += 1;
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("customer_state", ColumnType::Text),
        ColumnMeta::new("order_year", ColumnType::Integer),
        ColumnMeta::new("order_month", ColumnType::Integer),
        ColumnMeta::new("total_orders", ColumnType::Integer),
    ]);
    for ((state, year, month), count) in groups {
        rs.push_row(vec![
            Value::Text(state),
            Value::Integer(year as i64),
            Value::Integer(month as i64),
            Value::Integer(count),
        ]);
    }
    Ok(rs)
}

/// Distinct cities and states among customers that placed at least one
/// order.
pub(crate) fn customer_cities_states(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let customer_id = orders.col("customer_id")?;
    let mut ordering_customers: AHashSet<&str> = AHashSet::new();
    for row in orders.rows() {
        if let Some(cid) = row[customer_id].as_str() {
            ordering_customers.insert(cid);
        }
    }

    let customers = store.get("customers")?;
    let id = customers.col("customer_id")?;
    let city = customers.col("customer_city")?;
    let state = customers.col("customer_state")?;

    let mut cities: AHashSet<&str> = AHashSet::new();
    let mut states: AHashSet<&str> = AHashSet::new();
    for row in customers.rows() {
        let Some(cid) = row[id].as_str() else { continue };
        if !ordering_customers.contains(cid) {
            continue;
        }
        if let Some(c) = row[city].as_str() {
            cities.insert(c);
        }
        if let Some(s) = row[state].as_str() {
            states.insert(s);
        }
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("total_cities", ColumnType::Integer),
        ColumnMeta::new("total_states", ColumnType::Integer),
    ]);
    rs.push_row(vec![
        Value::Integer(cities.len() as i64),
        Value::Integer(states.len() as i64),
    ]);
    Ok(rs)
}
