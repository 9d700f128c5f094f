//! Product, review and customer-base queries

use crate::catalog::params::Params;
use crate::error::Result;
use crate::query::window::{percentage_of_total, round2};
use crate::query::{ColumnMeta, ResultSet};
use crate::store::TableStore;
use crate::types::{ColumnType, Value};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;

/// Best-selling product categories by item volume, with revenue. Items
/// whose product has no category are excluded.
pub(crate) fn top_product_categories(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let limit = params.expect("top_product_categories", "limit")? as usize;

    let products = store.get("products")?;
    let product_id = products.col("product_id")?;
    let category = products.col("product_category_name")?;

    let mut categories: AHashMap<&str, &str> = AHashMap::new();
    for row in products.rows() {
        if let (Some(pid), Some(cat)) = (row[product_id].as_str(), row[category].as_str()) {
            categories.insert(pid, cat);
        }
    }

    let items = store.get("order_items")?;
    let item_product = items.col("product_id")?;
    let price = items.col("price")?;

    let mut by_category: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for row in items.rows() {
        let (Some(pid), Some(value)) = (row[item_product].as_str(), row[price].as_f64()) else {
            continue;
        };
        let Some(cat) = categories.get(pid) else {
            continue;
        };
        let entry = by_category.entry(cat.to_string()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += value;
    }

    let mut entries: Vec<(String, i64, f64)> = by_category
        .into_iter()
        .map(|(cat, (count, revenue))| (cat, count, revenue))
        .collect();
    // Stable sort over the alphabetical key order: ties keep that order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("product_category_name", ColumnType::Text),
        ColumnMeta::new("total_items_sold", ColumnType::Integer),
        ColumnMeta::new("total_revenue", ColumnType::Float),
    ]);
    for (cat, count, revenue) in entries {
        rs.push_row(vec![
            Value::Text(cat),
            Value::Integer(count),
            Value::Float(revenue),
        ]);
    }
    Ok(rs)
}

/// Best-selling individual products by item volume, with revenue. Items
/// whose product_id is absent from the products relation drop out, as an
/// inner join would do.
pub(crate) fn top_products_by_volume(store: &TableStore, params: &Params) -> Result<ResultSet> {
    let limit = params.expect("top_products_by_volume", "limit")? as usize;

    let products = store.get("products")?;
    let product_id = products.col("product_id")?;
    let mut known: AHashSet<&str> = AHashSet::new();
    for row in products.rows() {
        if let Some(pid) = row[product_id].as_str() {
            known.insert(pid);
        }
    }

    let items = store.get("order_items")?;
    let item_product = items.col("product_id")?;
    let price = items.col("price")?;

    let mut by_product: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for row in items.rows() {
        let (Some(pid), Some(value)) = (row[item_product].as_str(), row[price].as_f64()) else {
            continue;
        };
        if !known.contains(pid) {
            continue;
        }
        let entry = by_product.entry(pid.to_string()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += value;
    }

    let mut entries: Vec<(String, i64, f64)> = by_product
        .into_iter()
        .map(|(pid, (count, revenue))| (pid, count, revenue))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("product_id", ColumnType::Text),
        ColumnMeta::new("total_items_sold", ColumnType::Integer),
        ColumnMeta::new("total_revenue", ColumnType::Float),
    ]);
    for (pid, count, revenue) in entries {
        rs.push_row(vec![
            Value::Text(pid),
            Value::Integer(count),
            Value::Float(revenue),
        ]);
    }
    Ok(rs)
}

/// Review counts per score (1-5) with percentage of total, best score
/// first. Null scores are excluded.
pub(crate) fn review_score_distribution(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let reviews = store.get("reviews")?;
    let score_col = reviews.col("review_score")?;

    let mut by_score: BTreeMap<i64, i64> = BTreeMap::new();
    for row in reviews.rows() {
        if let Some(score) = row[score_col].as_i64() {
            *by_score.entry(score).or_insert(0) += 1;
        }
    }

    let values: Vec<f64> = by_score.values().map(|&c| c as f64).collect();
    let percentages = percentage_of_total(&values);

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("review_score", ColumnType::Integer),
        ColumnMeta::new("review_count", ColumnType::Integer),
        ColumnMeta::new("percentage", ColumnType::Float),
    ]);
    for ((score, count), pct) in by_score.iter().zip(percentages).rev() {
        rs.push_row(vec![
            Value::Integer(*score),
            Value::Integer(*count),
            Value::Float(pct),
        ]);
    }
    Ok(rs)
}

/// Order counts per status with percentage of total, most common first.
pub(crate) fn order_status_distribution(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let status_col = orders.col("order_status")?;

    let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
    for row in orders.rows() {
        if let Some(status) = row[status_col].as_str() {
            *by_status.entry(status.to_string()).or_insert(0) += 1;
        }
    }

    let values: Vec<f64> = by_status.values().map(|&c| c as f64).collect();
    let percentages = percentage_of_total(&values);

    let mut entries: Vec<(String, i64, f64)> = by_status
        .into_iter()
        .zip(percentages)
        .map(|((status, count), pct)| (status, count, pct))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("order_status", ColumnType::Text),
        ColumnMeta::new("order_count", ColumnType::Integer),
        ColumnMeta::new("percentage", ColumnType::Float),
    ]);
    for (status, count, pct) in entries {
        rs.push_row(vec![
            Value::Text(status),
            Value::Integer(count),
            Value::Float(pct),
        ]);
    }
    Ok(rs)
}

/// Customer retention: how many customers placed more than one order.
pub(crate) fn customer_retention(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;
    let customer_id = orders.col("customer_id")?;

    let mut per_customer: AHashMap<&str, i64> = AHashMap::new();
    for row in orders.rows() {
        if let Some(cid) = row[customer_id].as_str() {
            *per_customer.entry(cid).or_insert(0) += 1;
        }
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("total_customers", ColumnType::Integer),
        ColumnMeta::new("repeat_customers", ColumnType::Integer),
        ColumnMeta::new("retention_rate", ColumnType::Float),
    ]);
    let total = per_customer.len() as i64;
    if total == 0 {
        return Ok(rs);
    }
    let repeat = per_customer.values().filter(|&&c| c > 1).count() as i64;
    rs.push_row(vec![
        Value::Integer(total),
        Value::Integer(repeat),
        Value::Float(round2(repeat as f64 * 100.0 / total as f64)),
    ]);
    Ok(rs)
}

/// Headline dataset counts for the overview tiles.
pub(crate) fn dataset_overview(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let orders = store.get("orders")?;

    let customers = store.get("customers")?;
    let customer_id = customers.col("customer_id")?;
    let mut distinct_customers: AHashSet<&str> = AHashSet::new();
    for row in customers.rows() {
        if let Some(cid) = row[customer_id].as_str() {
            distinct_customers.insert(cid);
        }
    }

    let sellers = store.get("sellers")?;
    let seller_id = sellers.col("seller_id")?;
    let mut distinct_sellers: AHashSet<&str> = AHashSet::new();
    for row in sellers.rows() {
        if let Some(sid) = row[seller_id].as_str() {
            distinct_sellers.insert(sid);
        }
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("total_orders", ColumnType::Integer),
        ColumnMeta::new("total_customers", ColumnType::Integer),
        ColumnMeta::new("total_sellers", ColumnType::Integer),
    ]);
    rs.push_row(vec![
        Value::Integer(orders.len() as i64),
        Value::Integer(distinct_customers.len() as i64),
        Value::Integer(distinct_sellers.len() as i64),
    ]);
    Ok(rs)
}

/// Sales-wide product metrics: distinct products sold, item volume, average
/// price and total revenue. Empty when nothing was sold.
pub(crate) fn product_performance(store: &TableStore, _params: &Params) -> Result<ResultSet> {
    let items = store.get("order_items")?;
    let product_id = items.col("product_id")?;
    let price = items.col("price")?;

    let mut distinct_products: AHashSet<&str> = AHashSet::new();
    let mut sold = 0i64;
    let mut revenue = 0.0f64;
    for row in items.rows() {
        let (Some(pid), Some(value)) = (row[product_id].as_str(), row[price].as_f64()) else {
            continue;
        };
        distinct_products.insert(pid);
        sold += 1;
        revenue += value;
    }

    let mut rs = ResultSet::new(vec![
        ColumnMeta::new("unique_products", ColumnType::Integer),
        ColumnMeta::new("total_items_sold", ColumnType::Integer),
        ColumnMeta::new("avg_price", ColumnType::Float),
        ColumnMeta::new("total_revenue", ColumnType::Float),
    ]);
    if sold == 0 {
        return Ok(rs);
    }
    rs.push_row(vec![
        Value::Integer(distinct_products.len() as i64),
        Value::Integer(sold),
        Value::Float(round2(revenue / sold as f64)),
        Value::Float(round2(revenue)),
    ]);
    Ok(rs)
}
