//! Delivery performance and freight queries

use crate::catalog::common::order_state_map;
use crate::catalog::params::Params;
use crate::error::Result;
use crate::query::window::{rank, Direction};
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Timestamp, Value};
use std::collections::BTreeMap;

/// Per-order delivery durations: purchase to delivery, and delivery against
/// the estimate. Positive `diff_estimated_delivery` means later than
/// estimated, negative means earlier. Orders without both dates drop out.
pub(crate) fn delivery_time_per_order(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let purchase = orders.col("order_purchase_timestamp")?;
    let delivered = orders.col("order_delivered_customer_date")?;
    let estimated = orders.col("order_estimated_delivery_date")?;

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("order_id", ColumnType::Text),
        ColumnMeta::new("order_purchase_timestamp", ColumnType::Timestamp),
        ColumnMeta::new("order_delivered_customer_date", ColumnType::Timestamp),
        ColumnMeta::new("order_estimated_delivery_date", ColumnType::Timestamp),
        ColumnMeta::new("time_to_deliver", ColumnType::Integer),
        ColumnMeta::new("diff_estimated_delivery", ColumnType::Integer),
    ]);
    for row in orders.rows() {
        let (Some(oid), Some(bought), Some(arrived), Some(promised)) = (
            row[order_id].as_str(),
            row[purchase].as_timestamp(),
            row[delivered].as_timestamp(),
            row[estimated].as_timestamp(),
        ) else {
            continue;
        };
        rs.push_row(vec![
            Value::Text(oid.to_string()),
            Value::Timestamp(bought),
            Value::Timestamp(arrived),
            Value::Timestamp(promised),
            Value::Integer(Timestamp::days_between(bought, arrived)),
            Value::Integer(Timestamp::days_between(promised, arrived)),
        ]);
    }
    Ok(rs)
}

/// Average freight value per state over the orders/customers/order_items
/// join, keyed alphabetically for the deterministic tie-break.
fn state_avg_freight(store: &TableStore) -> Result<Vec<(String, f64)>> {
    let by_order = order_state_map(store)?;
    let items = store.get("order_items")?;
    let order_id = items.col("order_id")?;
    let freight = items.col("freight_value")?;

    let mut by_state: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in items.rows() {
        let (Some(oid), Some(value)) = (row[order_id].as_str(), row[freight].as_f64()) else {
            continue;
        };
        let Some(state) = by_order.get(oid) else {
            continue;
        };
        let entry = by_state.entry(state.clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    Ok(by_state
        .into_iter()
        .map(|(state, (sum, count))| (state, sum / count as f64))
        .collect())
}

/// Average days from purchase to delivery per state. Undelivered orders are
/// excluded.
fn state_avg_delivery_days(store: &TableStore) -> Result<Vec<(String, f64)>> {
    let by_order = order_state_map(store)?;
    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let purchase = orders.col("order_purchase_timestamp")?;
    let delivered = orders.col("order_delivered_customer_date")?;

    let mut by_state: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in orders.rows() {
        let (Some(oid), Some(bought), Some(arrived)) = (
            row[order_id].as_str(),
            row[purchase].as_timestamp(),
            row[delivered].as_timestamp(),
        ) else {
            continue;
        };
        let Some(state) = by_order.get(oid) else {
            continue;
        };
        let entry = by_state.entry(state.clone()).or_insert((0.0, 0));
        entry.0 += Timestamp::days_between(bought, arrived) as f64;
        entry.1 += 1;
    }
    Ok(by_state
        .into_iter()
        .map(|(state, (sum, count))| (state, sum / count as f64))
        .collect())
}

fn ranked_states(
    entries: Vec<(String, f64)>,
    limit: usize,
    direction: Direction,
    value_name: &str,
) -> ResultSet {
    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("customer_state", ColumnType::Text),
        ColumnMeta::new(value_name, ColumnType::Float),
    ]);
    for (state, value) in rank(entries, limit, direction) {
        rs.push_row(vec![Value::Text(state), Value::Float(value)]);
    }
    rs
}

pub(crate) fn state_freight_extremes_high(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let limit = params.expect("state_freight_extremes_high", "limit")? as usize;
    Ok(ranked_states(
        state_avg_freight(store)?,
        limit,
        Direction::Descending,
        "avg_freight_value",
    ))
}

pub(crate) fn state_freight_extremes_low(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let limit = params.expect("state_freight_extremes_low", "limit")? as usize;
    Ok(ranked_states(
        state_avg_freight(store)?,
        limit,
        Direction::Ascending,
        "avg_freight_value",
    ))
}

pub(crate) fn state_delivery_time_extremes_high(
    store: &TableStore,
    params: &Params,
) -> Result<ResultSet> {
    let limit = params.expect("state_delivery_time_extremes_high", "limit")? as usize;
    Ok(ranked_states(
        state_avg_delivery_days(store)?,
        limit,
        Direction::Descending,
        "avg_delivery_days",
    ))
}

pub(crate) fn state_delivery_time_extremes_low(
    store: &TableStore,
    params: &Params,
) -> Result<ResultSet> {
    let limit = params.expect("state_delivery_time_extremes_low", "limit")? as usize;
    Ok(ranked_states(
        state_avg_delivery_days(store)?,
        limit,
        Direction::Ascending,
        "avg_delivery_days",
    ))
}

/// States that deliver ahead of the estimate: average (delivered - estimated)
/// days per state, keeping only strictly negative averages, most ahead
/// first. A state that averages exactly on time does not qualify.
pub(crate) fn fastest_states_vs_estimated(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let limit = params.expect("fastest_states_vs_estimated", "limit")? as usize;

    let by_order = order_state_map(store)?;
    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let delivered = orders.col("order_delivered_customer_date")?;
    let estimated = orders.col("order_estimated_delivery_date")?;

    let mut by_state: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in orders.rows() {
        let (Some(oid), Some(arrived), Some(promised)) = (
            row[order_id].as_str(),
            row[delivered].as_timestamp(),
            row[estimated].as_timestamp(),
        ) else {
            continue;
        };
        let Some(state) = by_order.get(oid) else {
            continue;
        };
        let entry = by_state.entry(state.clone()).or_insert((0.0, 0));
        entry.0 += Timestamp::days_between(promised, arrived) as f64;
        entry.1 += 1;
    }

    let early: Vec<(String, f64)> = by_state
        .into_iter()
        .map(|(state, (sum, count))| (state, sum / count as f64))
        .filter(|&(_, avg)| avg < 0.0)
        .collect();

    Ok(ranked_states(
        early,
        limit,
        Direction::Ascending,
        "avg_days_vs_estimated",
    ))
}
