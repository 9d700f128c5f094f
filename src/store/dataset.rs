//! Fixed schemas for the eight dataset relations

use crate::types::{ColumnDef, ColumnType, TableSchema};

use ColumnType::{Float, Integer, Text, Timestamp};

/// The eight logical tables, in load order.
pub const TABLE_NAMES: [&str; 8] = [
    "customers",
    "sellers",
    "order_items",
    "geolocation",
    "payments",
    "reviews",
    "orders",
    "products",
];

/// Default CSV file name per table. The reviews CSV ships as
/// `order_reviews.csv` in the source dataset.
pub fn default_file(table: &str) -> Option<&'static str> {
    match table {
        "customers" => Some("customers.csv"),
        "sellers" => Some("sellers.csv"),
        "order_items" => Some("order_items.csv"),
        "geolocation" => Some("geolocation.csv"),
        "payments" => Some("payments.csv"),
        "reviews" => Some("order_reviews.csv"),
        "orders" => Some("orders.csv"),
        "products" => Some("products.csv"),
        _ => None,
    }
}

/// Tables whose source files carry known encoding defects. The loader skips
/// unparsable rows for these instead of failing the whole load.
pub fn lenient(table: &str) -> bool {
    table == "reviews"
}

/// Expected schema for a dataset table.
pub fn schema(table: &str) -> Option<TableSchema> {
    let columns = match table {
        "customers" => vec![
            ColumnDef::new("customer_id", Text, 0).not_null(),
            ColumnDef::new("customer_city", Text, 1).not_null(),
            ColumnDef::new("customer_state", Text, 2).not_null(),
        ],
        "sellers" => vec![
            ColumnDef::new("seller_id", Text, 0).not_null(),
            ColumnDef::new("seller_city", Text, 1).not_null(),
            ColumnDef::new("seller_state", Text, 2).not_null(),
        ],
        "order_items" => vec![
            ColumnDef::new("order_id", Text, 0).not_null(),
            ColumnDef::new("order_item_id", Integer, 1).not_null(),
            ColumnDef::new("product_id", Text, 2).not_null(),
            ColumnDef::new("price", Float, 3).not_null(),
            ColumnDef::new("freight_value", Float, 4).not_null(),
        ],
        "geolocation" => vec![
            ColumnDef::new("geolocation_zip_code_prefix", Integer, 0).not_null(),
            ColumnDef::new("geolocation_city", Text, 1),
            ColumnDef::new("geolocation_state", Text, 2),
        ],
        "payments" => vec![
            ColumnDef::new("order_id", Text, 0).not_null(),
            ColumnDef::new("payment_type", Text, 1).not_null(),
            ColumnDef::new("payment_installments", Integer, 2).not_null(),
            ColumnDef::new("payment_value", Float, 3).not_null(),
        ],
        "reviews" => vec![
            ColumnDef::new("order_id", Text, 0).not_null(),
            ColumnDef::new("review_score", Integer, 1),
        ],
        "orders" => vec![
            ColumnDef::new("order_id", Text, 0).not_null(),
            ColumnDef::new("customer_id", Text, 1).not_null(),
            ColumnDef::new("order_status", Text, 2).not_null(),
            ColumnDef::new("order_purchase_timestamp", Timestamp, 3).not_null(),
            ColumnDef::new("order_delivered_customer_date", Timestamp, 4),
            ColumnDef::new("order_estimated_delivery_date", Timestamp, 5),
        ],
        "products" => vec![
            ColumnDef::new("product_id", Text, 0).not_null(),
            ColumnDef::new("product_category_name", Text, 1),
        ],
        _ => return None,
    };
    Some(TableSchema::new(table, columns))
}
