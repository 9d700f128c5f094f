//! Query Catalog: the fixed set of named analytical queries
//!
//! Each entry is a typed, parameterized query object: a stable id, the
//! relations it reads, the parameter schema it accepts, and a pure
//! aggregation function over the Table Store. The registry is static;
//! nothing is registered at runtime.

mod common;
mod delivery;
mod economy;
mod geography;
pub mod params;
mod payments;
mod products;
mod trends;

pub use params::{ParamSpec, Params};

use crate::error::{Result, VarejoError};
use crate::query::ResultSet;
use crate::store::TableStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryId {
    // Trends
    OrdersTimeRange,
    OrdersYoyGrowth,
    MonthlySeasonality,
    TimeOfDayDistribution,
    // Geography
    CustomerDistributionByState,
    MonthOnMonthOrdersByState,
    CustomerCitiesStates,
    // Economy
    CostIncreaseBetweenYears,
    OrderPriceByState,
    FreightByState,
    AvgOrderValueByState,
    // Delivery
    DeliveryTimePerOrder,
    StateFreightExtremesHigh,
    StateFreightExtremesLow,
    StateDeliveryTimeExtremesHigh,
    StateDeliveryTimeExtremesLow,
    FastestStatesVsEstimated,
    // Payments
    MonthlyOrdersByPaymentType,
    OrdersByInstallments,
    // Products
    TopProductCategories,
    TopProductsByVolume,
    ReviewScoreDistribution,
    OrderStatusDistribution,
    CustomerRetention,
    DatasetOverview,
    ProductPerformance,
}

impl QueryId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrdersTimeRange => "orders_time_range",
            Self::OrdersYoyGrowth => "orders_yoy_growth",
            Self::MonthlySeasonality => "monthly_seasonality",
            Self::TimeOfDayDistribution => "time_of_day_distribution",
            Self::CustomerDistributionByState => "customer_distribution_by_state",
            Self::MonthOnMonthOrdersByState => "month_on_month_orders_by_state",
            Self::CustomerCitiesStates => "customer_cities_states",
            Self::CostIncreaseBetweenYears => "cost_increase_between_years",
            Self::OrderPriceByState => "order_price_by_state",
            Self::FreightByState => "freight_by_state",
            Self::AvgOrderValueByState => "avg_order_value_by_state",
            Self::DeliveryTimePerOrder => "delivery_time_per_order",
            Self::StateFreightExtremesHigh => "state_freight_extremes_high",
            Self::StateFreightExtremesLow => "state_freight_extremes_low",
            Self::StateDeliveryTimeExtremesHigh => "state_delivery_time_extremes_high",
            Self::StateDeliveryTimeExtremesLow => "state_delivery_time_extremes_low",
            Self::FastestStatesVsEstimated => "fastest_states_vs_estimated",
            Self::MonthlyOrdersByPaymentType => "monthly_orders_by_payment_type",
            Self::OrdersByInstallments => "orders_by_installments",
            Self::TopProductCategories => "top_product_categories",
            Self::TopProductsByVolume => "top_products_by_volume",
            Self::ReviewScoreDistribution => "review_score_distribution",
            Self::OrderStatusDistribution => "order_status_distribution",
            Self::CustomerRetention => "customer_retention",
            Self::DatasetOverview => "dataset_overview",
            Self::ProductPerformance => "product_performance",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryId {
    type Err = VarejoError;

    fn from_str(s: &str) -> Result<Self> {
        CATALOG
            .iter()
            .map(|def| def.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| VarejoError::UnknownQuery(s.to_string()))
    }
}

/// Dashboard topic a query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Trends,
    Geography,
    Economy,
    Delivery,
    Payments,
    Products,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trends => "trends",
            Self::Geography => "geography",
            Self::Economy => "economy",
            Self::Delivery => "delivery",
            Self::Payments => "payments",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry: declared inputs plus the aggregation itself.
pub struct QueryDef {
    pub id: QueryId,
    pub topic: Topic,
    pub description: &'static str,
    /// Relations the query reads. The executor checks these are loaded
    /// before running.
    pub relations: &'static [&'static str],
    /// Declared parameter schema. Validation fills defaults and enforces
    /// ranges.
    pub params: &'static [ParamSpec],
    pub(crate) run: fn(&TableStore, &Params) -> Result<ResultSet>,
}

const NO_PARAMS: &[ParamSpec] = &[];
const LIMIT_5: &[ParamSpec] = &[ParamSpec::optional("limit", 5).at_least(1)];
const LIMIT_10: &[ParamSpec] = &[ParamSpec::optional("limit", 10).at_least(1)];
// month_to defaults to August: the dataset ends mid-2018, so the original
// comparison window is Jan-Aug of both years.
const YEAR_WINDOW: &[ParamSpec] = &[
    ParamSpec::required("base_year"),
    ParamSpec::required("target_year"),
    ParamSpec::optional("month_from", 1).range(1, 12),
    ParamSpec::optional("month_to", 8).range(1, 12),
];

/// The full query catalog, grouped by topic.
pub static CATALOG: &[QueryDef] = &[
    QueryDef {
        id: QueryId::OrdersTimeRange,
        topic: Topic::Trends,
        description: "First and last order dates and the span in days",
        relations: &["orders"],
        params: NO_PARAMS,
        run: trends::orders_time_range,
    },
    QueryDef {
        id: QueryId::OrdersYoyGrowth,
        topic: Topic::Trends,
        description: "Yearly order counts with year-over-year growth",
        relations: &["orders"],
        params: NO_PARAMS,
        run: trends::orders_yoy_growth,
    },
    QueryDef {
        id: QueryId::MonthlySeasonality,
        topic: Topic::Trends,
        description: "Order counts per year and month",
        relations: &["orders"],
        params: NO_PARAMS,
        run: trends::monthly_seasonality,
    },
    QueryDef {
        id: QueryId::TimeOfDayDistribution,
        topic: Topic::Trends,
        description: "Orders bucketed by time of day",
        relations: &["orders"],
        params: NO_PARAMS,
        run: trends::time_of_day_distribution,
    },
    QueryDef {
        id: QueryId::CustomerDistributionByState,
        topic: Topic::Geography,
        description: "Customer counts and share per state",
        relations: &["customers"],
        params: NO_PARAMS,
        run: geography::customer_distribution_by_state,
    },
    QueryDef {
        id: QueryId::MonthOnMonthOrdersByState,
        topic: Topic::Geography,
        description: "Order counts per state, year and month",
        relations: &["orders", "customers"],
        params: NO_PARAMS,
        run: geography::month_on_month_orders_by_state,
    },
    QueryDef {
        id: QueryId::CustomerCitiesStates,
        topic: Topic::Geography,
        description: "Distinct cities and states among ordering customers",
        relations: &["orders", "customers"],
        params: NO_PARAMS,
        run: geography::customer_cities_states,
    },
    QueryDef {
        id: QueryId::CostIncreaseBetweenYears,
        topic: Topic::Economy,
        description: "Payment total increase between two years in a month window",
        relations: &["orders", "payments"],
        params: YEAR_WINDOW,
        run: economy::cost_increase_between_years,
    },
    QueryDef {
        id: QueryId::OrderPriceByState,
        topic: Topic::Economy,
        description: "Total and average item price per state",
        relations: &["orders", "customers", "order_items"],
        params: NO_PARAMS,
        run: economy::order_price_by_state,
    },
    QueryDef {
        id: QueryId::FreightByState,
        topic: Topic::Economy,
        description: "Total and average freight value per state",
        relations: &["orders", "customers", "order_items"],
        params: NO_PARAMS,
        run: economy::freight_by_state,
    },
    QueryDef {
        id: QueryId::AvgOrderValueByState,
        topic: Topic::Economy,
        description: "Average order-level payment value per state",
        relations: &["orders", "customers", "payments"],
        params: NO_PARAMS,
        run: economy::avg_order_value_by_state,
    },
    QueryDef {
        id: QueryId::DeliveryTimePerOrder,
        topic: Topic::Delivery,
        description: "Per-order delivery time and difference to estimate",
        relations: &["orders"],
        params: NO_PARAMS,
        run: delivery::delivery_time_per_order,
    },
    QueryDef {
        id: QueryId::StateFreightExtremesHigh,
        topic: Topic::Delivery,
        description: "States with the highest average freight value",
        relations: &["orders", "customers", "order_items"],
        params: LIMIT_5,
        run: delivery::state_freight_extremes_high,
    },
    QueryDef {
        id: QueryId::StateFreightExtremesLow,
        topic: Topic::Delivery,
        description: "States with the lowest average freight value",
        relations: &["orders", "customers", "order_items"],
        params: LIMIT_5,
        run: delivery::state_freight_extremes_low,
    },
    QueryDef {
        id: QueryId::StateDeliveryTimeExtremesHigh,
        topic: Topic::Delivery,
        description: "States with the slowest average delivery",
        relations: &["orders", "customers"],
        params: LIMIT_5,
        run: delivery::state_delivery_time_extremes_high,
    },
    QueryDef {
        id: QueryId::StateDeliveryTimeExtremesLow,
        topic: Topic::Delivery,
        description: "States with the fastest average delivery",
        relations: &["orders", "customers"],
        params: LIMIT_5,
        run: delivery::state_delivery_time_extremes_low,
    },
    QueryDef {
        id: QueryId::FastestStatesVsEstimated,
        topic: Topic::Delivery,
        description: "States delivering ahead of the estimated date",
        relations: &["orders", "customers"],
        params: LIMIT_5,
        run: delivery::fastest_states_vs_estimated,
    },
    QueryDef {
        id: QueryId::MonthlyOrdersByPaymentType,
        topic: Topic::Payments,
        description: "Distinct orders per month and payment type",
        relations: &["orders", "payments"],
        params: NO_PARAMS,
        run: payments::monthly_orders_by_payment_type,
    },
    QueryDef {
        id: QueryId::OrdersByInstallments,
        topic: Topic::Payments,
        description: "Distinct orders per installment count",
        relations: &["payments"],
        params: NO_PARAMS,
        run: payments::orders_by_installments,
    },
    QueryDef {
        id: QueryId::TopProductCategories,
        topic: Topic::Products,
        description: "Best-selling product categories by item volume",
        relations: &["order_items", "products"],
        params: LIMIT_10,
        run: products::top_product_categories,
    },
    QueryDef {
        id: QueryId::TopProductsByVolume,
        topic: Topic::Products,
        description: "Best-selling individual products by item volume",
        relations: &["order_items", "products"],
        params: LIMIT_10,
        run: products::top_products_by_volume,
    },
    QueryDef {
        id: QueryId::ReviewScoreDistribution,
        topic: Topic::Products,
        description: "Review counts and share per score",
        relations: &["reviews"],
        params: NO_PARAMS,
        run: products::review_score_distribution,
    },
    QueryDef {
        id: QueryId::OrderStatusDistribution,
        topic: Topic::Products,
        description: "Order counts and share per status",
        relations: &["orders"],
        params: NO_PARAMS,
        run: products::order_status_distribution,
    },
    QueryDef {
        id: QueryId::CustomerRetention,
        topic: Topic::Products,
        description: "Customers with more than one order",
        relations: &["orders"],
        params: NO_PARAMS,
        run: products::customer_retention,
    },
    QueryDef {
        id: QueryId::DatasetOverview,
        topic: Topic::Products,
        description: "Headline order, customer and seller counts",
        relations: &["orders", "customers", "sellers"],
        params: NO_PARAMS,
        run: products::dataset_overview,
    },
    QueryDef {
        id: QueryId::ProductPerformance,
        topic: Topic::Products,
        description: "Distinct products, item volume, average price, revenue",
        relations: &["order_items"],
        params: NO_PARAMS,
        run: products::product_performance,
    },
];

/// Resolve a catalog entry by id.
pub fn lookup(id: QueryId) -> &'static QueryDef {
    // Registry drift is a bug; test_catalog_covers_every_id keeps this
    // infallible.
    CATALOG
        .iter()
        .find(|def| def.id == id)
        .expect("every QueryId is registered in CATALOG")
}
