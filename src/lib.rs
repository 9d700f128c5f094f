//! Varejo Analytics Engine
//!
//! In-process query layer over the Brazilian e-commerce retail dataset
//! (orders, customers, sellers, products, items, payments, reviews,
//! geolocation).
//!
//! ## Components
//! - Table Store: eight CSV relations loaded once into memory
//! - Query Catalog: fixed registry of parameterized aggregations by topic
//! - Executor: validates parameters, runs catalog queries, caches results
//! - Formatter: reshapes results into series, rankings, breakdowns, grids
//! - Export: CSV round-trip of any result set

pub mod catalog;
pub mod config;
pub mod export;
pub mod format;
pub mod query;
pub mod store;
pub mod types;

mod error;

pub use catalog::{lookup, Params, QueryDef, QueryId, Topic, CATALOG};
pub use config::DatasetConfig;
pub use error::{Result, VarejoError};
pub use format::{format, FormattedResult, Shape};
pub use query::{CacheStats, ColumnMeta, Executor, ResultSet};
pub use store::{Relation, TableStore};
pub use types::{ColumnType, Timestamp, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_fixture(dir: &Path) {
        let files: &[(&str, &str)] = &[
            (
                "customers.csv",
                "customer_id,customer_city,customer_state\n\
                 c1,sao paulo,SP\n\
                 c2,rio de janeiro,RJ\n\
                 c3,campinas,SP\n\
                 c4,belo horizonte,MG\n\
                 c5,niteroi,RJ\n\
                 c6,salvador,BA\n",
            ),
            (
                "sellers.csv",
                "seller_id,seller_city,seller_state\n\
                 s1,sao paulo,SP\n\
                 s2,rio de janeiro,RJ\n",
            ),
            (
                "orders.csv",
                "order_id,customer_id,order_status,order_purchase_timestamp,\
                 order_delivered_customer_date,order_estimated_delivery_date\n\
                 o1,c1,delivered,2017-03-05 10:00:00,2017-03-12 16:00:00,2017-03-15 00:00:00\n\
                 o2,c2,delivered,2017-07-20 14:30:00,2017-08-02 11:00:00,2017-07-30 00:00:00\n\
                 o3,c3,delivered,2018-01-10 20:15:00,2018-01-18 09:00:00,2018-01-25 00:00:00\n\
                 o4,c4,shipped,2018-05-03 02:00:00,,2018-05-20 00:00:00\n\
                 o5,c1,canceled,2018-06-30 09:00:00,,\n",
            ),
            (
                "order_items.csv",
                "order_id,order_item_id,product_id,price,freight_value\n\
                 o1,1,p1,50.0,10.0\n\
                 o2,1,p2,100.0,20.0\n\
                 o2,2,p1,30.0,5.0\n\
                 o3,1,p3,200.0,16.0\n",
            ),
            (
                "payments.csv",
                "order_id,payment_type,payment_installments,payment_value\n\
                 o1,credit_card,1,60.0\n\
                 o2,credit_card,2,100.0\n\
                 o2,voucher,1,55.0\n\
                 o3,credit_card,3,215.0\n\
                 o4,boleto,1,40.0\n",
            ),
            (
                "products.csv",
                "product_id,product_category_name\n\
                 p1,electronics\n\
                 p2,toys\n\
                 p3,\n",
            ),
            (
                "order_reviews.csv",
                "order_id,review_score\n\
                 o1,5\n\
                 o2,4\n\
                 o3,5\n\
                 o4,\n",
            ),
            (
                "geolocation.csv",
                "geolocation_zip_code_prefix,geolocation_city,geolocation_state\n\
                 1001,sao paulo,SP\n",
            ),
        ];
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn fixture_store() -> (tempfile::TempDir, TableStore) {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let store = TableStore::load_dataset(&DatasetConfig::new(dir.path())).unwrap();
        (dir, store)
    }

    fn num(rs: &ResultSet, row: usize, column: &str) -> f64 {
        rs.value(row, column).and_then(Value::as_f64).unwrap()
    }

    #[test]
    fn test_load_dataset_loads_all_tables() {
        let (_dir, store) = fixture_store();
        for table in store::dataset::TABLE_NAMES {
            assert!(store.contains(table), "missing table {table}");
        }
        assert_eq!(store.get("orders").unwrap().len(), 5);
        assert_eq!(store.get("customers").unwrap().len(), 6);
    }

    #[test]
    fn test_yearly_growth_from_two_to_three_orders() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor.run(QueryId::OrdersYoyGrowth, &Params::new()).unwrap();

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.value(0, "order_year"), Some(&Value::Integer(2017)));
        assert_eq!(rs.value(0, "yoy_growth_pct"), Some(&Value::Null));
        assert_eq!(rs.value(1, "total_orders"), Some(&Value::Integer(3)));
        assert_eq!(rs.value(1, "previous_year_orders"), Some(&Value::Integer(2)));
        assert_eq!(num(&rs, 1, "yoy_growth_pct"), 50.0);
    }

    #[test]
    fn test_distribution_percentages_sum_to_hundred() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        for id in [
            QueryId::CustomerDistributionByState,
            QueryId::TimeOfDayDistribution,
            QueryId::ReviewScoreDistribution,
            QueryId::OrderStatusDistribution,
        ] {
            let rs = executor.run(id, &Params::new()).unwrap();
            let total: f64 = rs
                .column_values("percentage")
                .iter()
                .filter_map(|v| v.as_f64())
                .sum();
            assert!((total - 100.0).abs() < 0.01, "{id}: percentages sum to {total}");
        }
    }

    #[test]
    fn test_time_of_day_counts_every_order_once() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::TimeOfDayDistribution, &Params::new())
            .unwrap();

        // 10:00 and 09:00 are Morning, 02:00 Dawn, 14:30 Afternoon, 20:15 Night.
        assert_eq!(rs.value(0, "time_of_day"), Some(&Value::Text("Morning".into())));
        assert_eq!(rs.value(0, "order_count"), Some(&Value::Integer(2)));
        let counted: i64 = rs
            .column_values("order_count")
            .iter()
            .filter_map(|v| v.as_i64())
            .sum();
        assert_eq!(counted, 5);
    }

    #[test]
    fn test_delivery_durations_and_estimate_sign() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::DeliveryTimePerOrder, &Params::new())
            .unwrap();

        // Only the three fully delivered orders qualify.
        assert_eq!(rs.len(), 3);
        for row in 0..rs.len() {
            assert!(num(&rs, row, "time_to_deliver") >= 0.0);
        }
        // o2 arrived three days after the estimate, o3 six days before it.
        assert_eq!(rs.value(1, "diff_estimated_delivery"), Some(&Value::Integer(3)));
        assert_eq!(rs.value(2, "diff_estimated_delivery"), Some(&Value::Integer(-6)));
    }

    #[test]
    fn test_freight_extremes_pick_opposite_states() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let params = Params::new().with("limit", 1);

        let high = executor.run(QueryId::StateFreightExtremesHigh, &params).unwrap();
        assert_eq!(high.value(0, "customer_state"), Some(&Value::Text("SP".into())));
        assert_eq!(num(&high, 0, "avg_freight_value"), 13.0);

        let low = executor.run(QueryId::StateFreightExtremesLow, &params).unwrap();
        assert_eq!(low.value(0, "customer_state"), Some(&Value::Text("RJ".into())));
        assert_eq!(num(&low, 0, "avg_freight_value"), 12.5);
    }

    #[test]
    fn test_fastest_states_require_negative_average() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::FastestStatesVsEstimated, &Params::new().with("limit", 10))
            .unwrap();

        // SP averages -4 days vs the estimate; RJ runs late and drops out.
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.value(0, "customer_state"), Some(&Value::Text("SP".into())));
        assert_eq!(num(&rs, 0, "avg_days_vs_estimated"), -4.0);
    }

    #[test]
    fn test_cost_increase_with_default_month_window() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let params = Params::new()
            .with("base_year", 2017)
            .with("target_year", 2018);
        let rs = executor.run(QueryId::CostIncreaseBetweenYears, &params).unwrap();

        assert_eq!(rs.len(), 1);
        assert_eq!(num(&rs, 0, "base_cost"), 215.0);
        assert_eq!(num(&rs, 0, "target_cost"), 255.0);
        assert_eq!(num(&rs, 0, "percentage_increase"), 18.6);
    }

    #[test]
    fn test_cost_increase_same_year_rejected() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let params = Params::new()
            .with("base_year", 2017)
            .with("target_year", 2017);
        // A self-comparison would claim a -100% drop; reject it instead.
        let err = executor
            .run(QueryId::CostIncreaseBetweenYears, &params)
            .unwrap_err();
        assert!(matches!(err, VarejoError::InvalidParameter { .. }));
        assert!(err.to_string().contains("target_year"));
    }

    #[test]
    fn test_cost_increase_missing_year_is_empty() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let params = Params::new()
            .with("base_year", 2015)
            .with("target_year", 2018);
        let rs = executor.run(QueryId::CostIncreaseBetweenYears, &params).unwrap();
        assert!(rs.is_empty());
    }

    #[test]
    fn test_category_ranking_skips_uncategorized_products() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::TopProductCategories, &Params::new())
            .unwrap();

        assert_eq!(rs.len(), 2);
        assert_eq!(
            rs.value(0, "product_category_name"),
            Some(&Value::Text("electronics".into()))
        );
        assert_eq!(rs.value(0, "total_items_sold"), Some(&Value::Integer(2)));
        assert_eq!(num(&rs, 0, "total_revenue"), 80.0);
    }

    #[test]
    fn test_product_volume_ranking() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::TopProductsByVolume, &Params::new().with("limit", 2))
            .unwrap();

        // p1 sold twice; p2 and p3 tie at one item and break by product id.
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.value(0, "product_id"), Some(&Value::Text("p1".into())));
        assert_eq!(rs.value(0, "total_items_sold"), Some(&Value::Integer(2)));
        assert_eq!(num(&rs, 0, "total_revenue"), 80.0);
        assert_eq!(rs.value(1, "product_id"), Some(&Value::Text("p2".into())));
    }

    #[test]
    fn test_retention_counts_repeat_customers() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor.run(QueryId::CustomerRetention, &Params::new()).unwrap();

        assert_eq!(rs.value(0, "total_customers"), Some(&Value::Integer(4)));
        assert_eq!(rs.value(0, "repeat_customers"), Some(&Value::Integer(1)));
        assert_eq!(num(&rs, 0, "retention_rate"), 25.0);
    }

    #[test]
    fn test_repeat_runs_hit_the_cache() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let params = Params::new();
        let first = executor.run(QueryId::OrdersYoyGrowth, &params).unwrap();
        let second = executor.run(QueryId::OrdersYoyGrowth, &params).unwrap();

        assert_eq!(first, second);
        let stats = executor.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_seasonality_formats_as_time_series() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor.run(QueryId::MonthlySeasonality, &Params::new()).unwrap();

        let FormattedResult::TimeSeries(points) = format(&rs, Shape::TimeSeries).unwrap() else {
            panic!("wrong variant")
        };
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].period, "2017-03");
        assert_eq!(points[0].value, 1.0);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::StateFreightExtremesHigh, &Params::new().with("limit", 5))
            .unwrap();

        assert!(matches!(
            format(&rs, Shape::PercentageBreakdown).unwrap_err(),
            VarejoError::UnsupportedShape { .. }
        ));
        assert!(format(&rs, Shape::RankedList { limit: None }).is_ok());
    }

    #[test]
    fn test_exported_result_reads_back_identical() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let rs = executor
            .run(QueryId::CustomerDistributionByState, &Params::new())
            .unwrap();

        let text = export::to_csv_string(&rs).unwrap();
        let revived = export::read_csv(text.as_bytes()).unwrap();
        assert_eq!(
            revived.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            rs.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(revived.rows, rs.rows);
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let (_dir, store) = fixture_store();
        let executor = Executor::new(&store);
        let err = executor
            .run(QueryId::OrdersYoyGrowth, &Params::new().with("limit", 3))
            .unwrap_err();
        assert!(matches!(err, VarejoError::InvalidParameter { .. }));
    }
}
