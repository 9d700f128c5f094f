//! Order volume trend queries

use crate::catalog::params::Params;
use crate::error::Result;
use crate::query::window::{lag_growth, percentage_of_total};
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Timestamp, Value};
use std::collections::BTreeMap;

/// Time-of-day buckets, in catalog order. Every hour 0-23 maps to exactly
/// one bucket.
const TIME_OF_DAY: [&str; 4] = ["Dawn", "Morning", "Afternoon", "Night"];

fn time_of_day_bucket(hour: u32) -> usize {
    match hour {
        0..=6 => 0,
        7..=12 => 1,
        13..=18 => 2,
        _ => 3,
    }
}

/// First and last purchase timestamp plus the span in days. Empty when the
/// orders relation holds no rows.
pub(crate) fn orders_time_range(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut range: Option<(Timestamp, Timestamp)> = None;
    for row in orders.rows() {
        let Some(ts) = row[purchase].as_timestamp() else {
            continue;
        };
        range = Some(match range {
            None => (ts, ts),
            Some((first, last)) => (first.min(ts), last.max(ts)),
        });
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("first_order_date", ColumnType::Timestamp),
        ColumnMeta::new("last_order_date", ColumnType::Timestamp),
        ColumnMeta::new("total_days", ColumnType::Integer),
    ]);
    if let Some((first, last)) = range {
        rs.push_row(vec![
            Value::Timestamp(first),
            Value::Timestamp(last),
            Value::Integer(Timestamp::days_between(first, last)),
        ]);
    }
    Ok(rs)
}

/// Yearly order counts with LAG-style growth against the prior year. The
/// first year has no base and reports null growth.
pub(crate) fn orders_yoy_growth(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut by_year: BTreeMap<i32, i64> = BTreeMap::new();
    for row in orders.rows() {
        if let Some(ts) = row[purchase].as_timestamp() {
            *by_year.entry(ts.year()).or_insert(0) += 1;
        }
    }

    let counts: Vec<f64> = by_year.values().map(|&c| c as f64).collect();
    let growth = lag_growth(&counts);

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("order_year", ColumnType::Integer),
        ColumnMeta::new("total_orders", ColumnType::Integer),
        ColumnMeta::new("previous_year_orders", ColumnType::Integer).nullable(),
        ColumnMeta::new("yoy_growth_pct", ColumnType::Float).nullable(),
    ]);
    let mut prev: Option<i64> = None;
    for ((year, count), growth) in by_year.iter().zip(growth) {
        rs.push_row(vec![
            Value::Integer(*year as i64),
            Value::Integer(*count),
            prev.map_or(Value::Null, Value::Integer),
            growth.map_or(Value::Null, Value::Float),
        ]);
        prev = Some(*count);
    }
    Ok(rs)
}

/// Order counts per (year, month), in chronological order.
pub(crate) fn monthly_seasonality(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut by_month: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for row in orders.rows() {
        if let Some(ts) = row[purchase].as_timestamp() {
            *by_month.entry((ts.year(), ts.month())).or_insert(0) += 1;
        }
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("order_year", ColumnType::Integer),
        ColumnMeta::new("order_month", ColumnType::Integer),
        ColumnMeta::new("total_orders", ColumnType::Integer),
    ]);
    for ((year, month), count) in by_month {
        rs.push_row(vec![
            Value::Integer(year as i64),
            Value::Integer(month as i64),
            Value::Integer(count),
        ]);
    }
    Ok(rs)
}

/// Purchase counts bucketed by time of day (Dawn 0-6, Morning 7-12,
/// Afternoon 13-18, Night 19-23) with percentage of total, busiest first.
pub(crate) fn time_of_day_distribution(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut counts = [0i64; 4];
    for row in orders.rows() {
        if let Some(ts) = row[purchase].as_timestamp() {
            counts[time_of_day_bucket(ts.hour())] += 1;
        }
    }

    // Only buckets with orders appear, as a GROUP BY would produce.
    let present: Vec<(usize, i64)> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 0)
        .map(|(i, &c)| (i, c))
        .collect();
    let values: Vec<f64> = present.iter().map(|&(_, c)| c as f64).collect();
    let percentages = percentage_of_total(&values);

    let mut entries: Vec<(usize, i64, f64)> = present
        .iter()
        .zip(percentages)
        .map(|(&(bucket, count), pct)| (bucket, count, pct))
        .collect();
    // Busiest bucket first; stable sort keeps catalog order on ties.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("time_of_day", ColumnType::Text),
        ColumnMeta::new("order_count", ColumnType::Integer),
        ColumnMeta::new("percentage", ColumnType::Float),
    ]);
    for (bucket, count, pct) in entries {
        rs.push_row(vec![
            Value::Text(TIME_OF_DAY[bucket].to_string()),
            Value::Integer(count),
            Value::Float(pct),
        ]);
    }
    Ok(rs)
}
