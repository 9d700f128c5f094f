//! Revenue and spend queries

use crate::catalog::common::order_state_map;
use crate::catalog::params::Params;
use crate::error::{Result, VarejoError};
use crate::query::window::round2;
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Value};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Total payment value in a month window of two years, with the percentage
/// increase from base to target.
///
/// A year with no qualifying orders makes the comparison meaningless, so the
/// result is empty rather than an error. A zero base cost reports a null
/// percentage.
pub(crate) fn cost_increase_between_years(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let id = "cost_increase_between_years";
    let base_year = params.expect(id, "base_year")?;
    let target_year = params.expect(id, "target_year")?;
    let month_from = params.expect(id, "month_from")?;
    let month_to = params.expect(id, "month_to")?;
    if month_from > month_to {
        return Err(VarejoError::InvalidParameter {
            query: id.to_string(),
            name: "month_from".to_string(),
            reason: format!("month_from {month_from} is after month_to {month_to}"),
        });
    }
    // Equal years would route every payment to the base side of the match
    // below and report a bogus -100% drop.
    if base_year == target_year {
        return Err(VarejoError::InvalidParameter {
            query: id.to_string(),
            name: "target_year".to_string(),
            reason: format!("target_year {target_year} equals base_year"),
        });
    }

    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    // order_id -> year, restricted to the two years and the month window.
    let mut order_year: AHashMap<&str, i64> = AHashMap::new();
    for row in orders.rows() {
        let (Some(oid), Some(ts)) = (row[order_id].as_str(), row[purchase].as_timestamp()) else {
            continue;
        };
        let year = ts.year() as i64;
        let month = ts.month() as i64;
        if (year == base_year || year == target_year) && (month_from..=month_to).contains(&month) {
            order_year.insert(oid, year);
        }
    }

    let payments = store.get("payments")?;
    let pay_order = payments.col("order_id")?;
    let pay_value = payments.col("payment_value")?;

    let mut base_cost = 0.0;
    let mut target_cost = 0.0;
    for row in payments.rows() {
        let (Some(oid), Some(value)) = (row[pay_order].as_str(), row[pay_value].as_f64()) else {
            continue;
        };
        match order_year.get(oid) {
            Some(&y) if y == base_year => base_cost += value,
            Some(&y) if y == target_year => target_cost += value,
            _ => {}
        }
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("base_year", ColumnType::Integer),
        ColumnMeta::new("base_cost", ColumnType::Float),
        ColumnMeta::new("target_year", ColumnType::Integer),
        ColumnMeta::new("target_cost", ColumnType::Float),
        ColumnMeta::new("percentage_increase", ColumnType::Float).nullable(),
    ]);

    // Out-of-range years: no orders fell in either window.
    let base_seen = order_year.values().any(|&y| y == base_year);
    let target_seen = order_year.values().any(|&y| y == target_year);
    if !base_seen || !target_seen {
        return Ok(rs);
    }

    let pct = if base_cost == 0.0 {
        Value::Null
    } else {
        Value::Float(round2((target_cost - base_cost) * 100.0 / base_cost))
    };
    rs.push_row(vec![
        Value::Integer(base_year),
        Value::Float(base_cost),
        Value::Integer(target_year),
        Value::Float(target_cost),
        pct,
    ]);
    Ok(rs)
}

/// Sum and average of an order_items column per customer state, largest
/// total first.
fn item_value_by_state(
    store: &TableStore,
    value_column: &str,
    total_name: &str,
    avg_name: &str,
) -> Result<ResultSet> {
    let by_order = order_state_map(store)?;
    let items = store.get("order_items")?;
    let order_id = items.col("order_id")?;
    let value_col = items.col(value_column)?;

    let mut by_state: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in items.rows() {
        let (Some(oid), Some(value)) = (row[order_id].as_str(), row[value_col].as_f64()) else {
            continue;
        };
        let Some(state) = by_order.get(oid) else {
            continue;
        };
        let entry = by_state.entry(state.clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut entries: Vec<(String, f64, f64)> = by_state
        .into_iter()
        .map(|(state, (sum, count))| (state, sum, sum / count as f64))
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("customer_state", ColumnType::Text),
        ColumnMeta::new(total_name, ColumnType::Float),
        ColumnMeta::new(avg_name, ColumnType::Float),
    ]);
    for (state, total, avg) in entries {
        rs.push_row(vec![
            Value::Text(state),
            Value::Float(total),
            Value::Float(avg),
        ]);
    }
    Ok(rs)
}

/// Item price per state: total and average.
pub(crate) fn order_price_by_state(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    item_value_by_state(store, "price", "total_order_price", "avg_order_price")
}

/// Freight charges per state: total and average.
pub(crate) fn freight_by_state(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    item_value_by_state(store, "freight_value", "total_freight_value", "avg_freight_value")
}

/// Average order value per state.
///
/// An order may split its payment across several rows; those rows sum into
/// one order-level value before the per-state average, so a 3-way split
/// counts as one order, not three.
pub(crate) fn avg_order_value_by_state(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let payments = store.get("payments")?;
    let pay_order = payments.col("order_id")?;
    let pay_value = payments.col("payment_value")?;

    let mut order_totals: AHashMap<String, f64> = AHashMap::new();
    for row in payments.rows() {
        let (Some(oid), Some(value)) = (row[pay_order].as_str(), row[pay_value].as_f64()) else {
            continue;
        };
        *order_totals.entry(oid.to_string()).or_insert(0.0) += value;
    }

    let by_order = order_state_map(store)?;
    let mut by_state: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for (oid, total) in &order_totals {
        let Some(state) = by_order.get(oid) else {
            continue;
        };
        let entry = by_state.entry(state.clone()).or_insert((0.0, 0));
        entry.0 += total;
        entry.1 += 1;
    }

    let mut entries: Vec<(String, u64, f64, f64)> = by_state
        .into_iter()
        .map(|(state, (revenue, orders))| (state, orders, revenue, revenue / orders as f64))
        .collect();
    entries.sort_by(|a, b| b.3.partial_cmp(&a.3).unwrap_or(std::cmp::Ordering::Equal));

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("customer_state", ColumnType::Text),
        ColumnMeta::new("total_orders", ColumnType::Integer),
        ColumnMeta::new("total_revenue", ColumnType::Float),
        ColumnMeta::new("avg_order_value", ColumnType::Float),
    ]);
    for (state, orders, revenue, avg) in entries {
        rs.push_row(vec![
            Value::Text(state),
            Value::Integer(orders as i64),
            Value::Float(revenue),
            Value::Float(avg),
        ]);
    }
    Ok(rs)
}
