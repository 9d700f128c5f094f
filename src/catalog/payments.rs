//! Payment method and installment queries

use crate::catalog::params::Params;
use crate::error::Result;
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Value};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;

/// Distinct order counts per (year, month, payment type). An order paid
/// with two methods counts once under each.
pub(crate) fn monthly_orders_by_payment_type(
    store: &TableStore,
    _params: &Params,
) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let order_id = orders.col("order_id")?;
    let purchase = orders.col("order_purchase_timestamp")?;

    let mut order_month: AHashMap<&str, (i32, u32)> = AHashMap::new();
    for row in orders.rows() {
        if let (Some(oid), Some(ts)) = (row[order_id].as_str(), row[purchase].as_timestamp()) {
            order_month.insert(oid, (ts.year(), ts.month()));
        }
    }

    let payments = store.get("payments")?;
    let pay_order = payments.col("order_id")?;
    let pay_type = payments.col("payment_type")?;

    let mut groups: BTreeMap<(i32, u32, String), AHashSet<&str>> = BTreeMap::new();
    for row in payments.rows() {
        let (Some(oid), Some(ptype)) = (row[pay_order].as_str(), row[pay_type].as_str()) else {
            continue;
        };
        let Some(&(year, month)) = order_month.get(oid) else {
            continue;
        };
        groups
            .entry((year, month, ptype.to_string()))
            .or_default()
            .insert(oid);
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("order_year", ColumnType::Integer),
        ColumnMeta::new("order_month", ColumnType::Integer),
        ColumnMeta::new("payment_type", ColumnType::Text),
        ColumnMeta::new("order_count", ColumnType::Integer),
    ]);
    for ((year, month, ptype), order_ids) in groups {
        rs.push_row(vec![
            Value::Integer(year as i64),
            Value::Integer(month as i64),
            Value::Text(ptype),
            Value::Integer(order_ids.len() as i64),
        ]);
    }
    Ok(rs)
}

/// Distinct order counts per installment count, lowest installment first.
pub(crate) fn orders_by_installments(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let payments = store.get("payments")?;
    let order_id = payments.col("order_id")?;
    let installments = payments.col("payment_installments")?;

    let mut groups: BTreeMap<i64, AHashSet<&str>> = BTreeMap::new();
    for row in payments.rows() {
        let (Some(oid), Some(n)) = (row[order_id].as_str(), row[installments].as_i64()) else {
            continue;
        };
        groups.entry(n).or_default().insert(oid);
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("payment_installments", ColumnType::Integer),
        ColumnMeta::new("order_count", ColumnType::Integer),
    ]);
    for (n, order_ids) in groups {
        rs.push_row(vec![
            Value::Integer(n),
            Value::Integer(order_ids.len() as i64),
        ]);
    }
    Ok(rs)
}
