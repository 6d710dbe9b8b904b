//! Admin dashboard aggregations.
//!
//! This module computes the dashboard KPIs, sales trends, item popularity,
//! customer insights and the inventory forecast from the orders, payments and
//! meals collections. The pure `compute_*` functions do the math; the
//! [`AnalyticsAggregator`] reads the collections and feeds them in.
//!
//! An unreadable collection is treated as empty, so the dashboard always
//! renders, possibly with zero-valued metrics.

use crate::{
    core::{catalog::Catalog, scoring::SalesPeriod},
    models::{OrderItem, OrderRecord, PaymentRecord},
    store::{self, Collection, CollectionStore},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, instrument};

/// Length of the inventory forecast window in days.
pub const FORECAST_WINDOW_DAYS: i64 = 30;
/// Category reported for items missing from the catalog.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Headline dashboard KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Number of orders
    pub total_orders: usize,
    /// Sum of successful payments, major currency units
    pub total_revenue: f64,
    /// `total_revenue / total_orders`, 0 without orders
    pub avg_order_value: f64,
    /// Distinct non-empty customer emails
    pub unique_customers: usize,
    /// Orders without a payment sharing their id
    pub pending_orders: usize,
    /// Number of successful payments
    pub completed_orders: usize,
    /// `completed / total * 100` with two decimals and a `%` suffix
    pub conversion_rate: String,
}

/// Revenue and payment count for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesBucket {
    /// Bucket key, see [`SalesPeriod::bucket_key`]
    pub period: String,
    /// Major currency units
    pub revenue: f64,
    /// Payments in the bucket
    pub orders: usize,
}

/// Sales figures for one item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    /// Meal id as written on the order lines
    pub id: String,
    /// Name on the first order line seen for the id
    pub name: String,
    /// Units sold across all orders
    pub quantity: u64,
    /// `Σ price * quantity`, major currency units
    pub revenue: f64,
    /// `revenue / quantity`
    pub avg_order_value: f64,
    /// Catalog category, [`UNCATEGORIZED`] for unknown ids
    pub category: String,
    /// Catalog image, if the id is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price on the first order line seen for the id
    pub price: f64,
}

/// A customer's most ordered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    /// Meal id
    pub id: String,
    /// Name on the first line seen
    pub name: String,
    /// Units the customer ordered in total
    pub quantity: u64,
}

/// Order statistics for one customer email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInsight {
    /// Grouping key
    pub email: String,
    /// Name on the customer's first order
    pub name: String,
    /// Number of orders
    pub order_count: usize,
    /// `Σ price * quantity` over all orders
    pub total_spent: f64,
    /// `total_spent / order_count`
    pub avg_order_value: f64,
    /// Item with the most units; ties keep the first seen
    pub top_favorite_item: Option<FavoriteItem>,
    /// Latest order date; `None` if no order is dated
    pub last_order_date: Option<DateTime<Utc>>,
}

/// Projected demand for one item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    /// Meal id
    pub id: String,
    /// Name on the first line seen inside the window
    pub name: String,
    /// Units ordered inside the window
    pub total_quantity: u64,
    /// `total_quantity / 30`
    pub daily_rate: f64,
    /// `ceil(daily_rate * 7)`
    pub weekly_forecast: u64,
    /// `ceil(daily_rate * 30)`
    pub monthly_forecast: u64,
    /// Catalog category, if the id is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Reads the collections behind the admin dashboard.
#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: Arc<dyn CollectionStore>,
}

impl AnalyticsAggregator {
    /// Creates an aggregator reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    async fn orders(&self) -> Vec<OrderRecord> {
        store::load_or_empty(self.store.as_ref(), Collection::Orders).await
    }

    async fn payments(&self) -> Vec<PaymentRecord> {
        store::load_or_empty(self.store.as_ref(), Collection::Payments).await
    }

    async fn catalog(&self) -> Catalog {
        Catalog::from_meals(store::load_or_empty(self.store.as_ref(), Collection::Meals).await)
    }

    /// Headline KPIs over all orders and payments.
    #[instrument(skip(self))]
    pub async fn summary(&self) -> DashboardSummary {
        compute_summary(&self.orders().await, &self.payments().await)
    }

    /// Payments grouped by `period`, ascending by bucket key.
    #[instrument(skip(self))]
    pub async fn sales_trends(&self, period: SalesPeriod) -> Vec<SalesBucket> {
        compute_sales_trends(&self.payments().await, period)
    }

    /// Items by units sold, descending.
    #[instrument(skip(self))]
    pub async fn popular_items(&self) -> Vec<PopularItem> {
        compute_popular_items(&self.orders().await, &self.catalog().await)
    }

    /// Customers by total spent, descending.
    #[instrument(skip(self))]
    pub async fn customer_insights(&self) -> Vec<CustomerInsight> {
        compute_customer_insights(&self.orders().await)
    }

    /// Demand forecast from the 30 days before now.
    pub async fn inventory_forecast(&self) -> Vec<ForecastItem> {
        self.inventory_forecast_at(Utc::now()).await
    }

    /// Demand forecast from the 30 days before `now`.
    #[instrument(skip(self))]
    pub async fn inventory_forecast_at(&self, now: DateTime<Utc>) -> Vec<ForecastItem> {
        compute_inventory_forecast(&self.orders().await, &self.catalog().await, now)
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// Computes the [`DashboardSummary`].
#[must_use]
pub fn compute_summary(orders: &[OrderRecord], payments: &[PaymentRecord]) -> DashboardSummary {
    let total_orders = orders.len();
    let completed_orders = payments.len();
    let total_revenue: f64 = payments.iter().map(PaymentRecord::amount_major).sum();

    let unique_customers = orders
        .iter()
        .map(|order| order.customer.email.as_str())
        .filter(|email| !email.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let paid_ids: HashSet<&str> = payments.iter().map(|payment| payment.id.as_str()).collect();
    let pending_orders = orders
        .iter()
        .filter(|order| !paid_ids.contains(order.id.as_str()))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let conversion_rate = average(completed_orders as f64 * 100.0, total_orders);

    DashboardSummary {
        total_orders,
        total_revenue,
        avg_order_value: average(total_revenue, total_orders),
        unique_customers,
        pending_orders,
        completed_orders,
        conversion_rate: format!("{conversion_rate:.2}%"),
    }
}

/// Groups payments into calendar buckets. Undated payments are skipped.
#[must_use]
pub fn compute_sales_trends(payments: &[PaymentRecord], period: SalesPeriod) -> Vec<SalesBucket> {
    let mut buckets: BTreeMap<String, (i64, usize)> = BTreeMap::new();

    for payment in payments {
        let Some(date) = payment.date else {
            debug!(payment_id = %payment.id, "Skipping undated payment");
            continue;
        };
        let bucket = buckets.entry(period.bucket_key(date)).or_default();
        bucket.0 += payment.amount_total;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(period, (minor_total, orders))| {
            #[allow(clippy::cast_precision_loss)]
            let revenue = minor_total as f64 / 100.0;
            SalesBucket {
                period,
                revenue,
                orders,
            }
        })
        .collect()
}

/// Accumulates units and revenue per item id, sorted by units descending.
///
/// Items with equal quantity keep the order they were first seen in.
#[must_use]
pub fn compute_popular_items(orders: &[OrderRecord], catalog: &Catalog) -> Vec<PopularItem> {
    let mut items: Vec<PopularItem> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for line in orders.iter().flat_map(|order| &order.items) {
        let position = *positions.entry(line.id.as_str()).or_insert_with(|| {
            let meal = catalog.by_id(&line.id);
            items.push(PopularItem {
                id: line.id.clone(),
                name: line.name.clone(),
                quantity: 0,
                revenue: 0.0,
                avg_order_value: 0.0,
                category: meal.map_or_else(|| UNCATEGORIZED.to_string(), |m| m.category.clone()),
                image: meal.map(|m| m.image.clone()),
                price: line.price,
            });
            items.len() - 1
        });
        let item = &mut items[position];
        item.quantity += u64::from(line.quantity);
        item.revenue += line.line_total();
    }

    for item in &mut items {
        #[allow(clippy::cast_precision_loss)]
        let quantity = item.quantity as f64;
        if quantity > 0.0 {
            item.avg_order_value = item.revenue / quantity;
        }
    }

    items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    items
}

/// Units per item id, in first-seen order.
#[derive(Default)]
struct QuantityTally<'a> {
    positions: HashMap<&'a str, usize>,
    // (id, name on first line, quantity)
    entries: Vec<(&'a str, &'a str, u64)>,
}

impl<'a> QuantityTally<'a> {
    fn add(&mut self, line: &'a OrderItem) {
        let entries = &mut self.entries;
        let position = *self.positions.entry(line.id.as_str()).or_insert_with(|| {
            entries.push((line.id.as_str(), line.name.as_str(), 0));
            entries.len() - 1
        });
        entries[position].2 += u64::from(line.quantity);
    }
}

struct CustomerTally<'a> {
    name: &'a str,
    order_count: usize,
    total_spent: f64,
    last_order_date: Option<DateTime<Utc>>,
    histogram: QuantityTally<'a>,
}

impl CustomerTally<'_> {
    fn favorite(&self) -> Option<FavoriteItem> {
        let mut best: Option<&(&str, &str, u64)> = None;
        for entry in &self.histogram.entries {
            if best.is_none_or(|current| entry.2 > current.2) {
                best = Some(entry);
            }
        }
        best.map(|&(id, name, quantity)| FavoriteItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
        })
    }
}

/// Groups orders by customer email, sorted by total spent descending.
#[must_use]
pub fn compute_customer_insights(orders: &[OrderRecord]) -> Vec<CustomerInsight> {
    let mut tallies: Vec<(&str, CustomerTally<'_>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for order in orders {
        let email = order.customer.email.as_str();
        let position = *positions.entry(email).or_insert_with(|| {
            tallies.push((
                email,
                CustomerTally {
                    name: order.customer.name.as_str(),
                    order_count: 0,
                    total_spent: 0.0,
                    last_order_date: None,
                    histogram: QuantityTally::default(),
                },
            ));
            tallies.len() - 1
        });

        let tally = &mut tallies[position].1;
        tally.order_count += 1;
        tally.total_spent += order.total();
        if let Some(date) = order.date {
            tally.last_order_date = Some(tally.last_order_date.map_or(date, |last| last.max(date)));
        }

        for line in &order.items {
            tally.histogram.add(line);
        }
    }

    let mut insights: Vec<CustomerInsight> = tallies
        .into_iter()
        .map(|(email, tally)| {
            let avg_order_value = average(tally.total_spent, tally.order_count);
            CustomerInsight {
                email: email.to_string(),
                name: tally.name.to_string(),
                order_count: tally.order_count,
                total_spent: tally.total_spent,
                avg_order_value,
                top_favorite_item: tally.favorite(),
                last_order_date: tally.last_order_date,
            }
        })
        .collect();

    insights.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(Ordering::Equal)
    });
    insights
}

/// Projects demand from orders dated within 30 days before `now`.
///
/// Undated orders are left out. Sorted by monthly forecast descending.
#[must_use]
pub fn compute_inventory_forecast(
    orders: &[OrderRecord],
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Vec<ForecastItem> {
    let window_start = now - TimeDelta::days(FORECAST_WINDOW_DAYS);
    let mut totals = QuantityTally::default();

    let recent = orders
        .iter()
        .filter(|order| order.date.is_some_and(|date| date >= window_start));
    for line in recent.flat_map(|order| &order.items) {
        totals.add(line);
    }

    let window = FORECAST_WINDOW_DAYS.unsigned_abs();
    let mut forecast: Vec<ForecastItem> = totals
        .entries
        .into_iter()
        .map(|(id, name, total_quantity)| {
            #[allow(clippy::cast_precision_loss)]
            let daily_rate = total_quantity as f64 / window as f64;
            ForecastItem {
                id: id.to_string(),
                name: name.to_string(),
                total_quantity,
                daily_rate,
                weekly_forecast: (total_quantity * 7).div_ceil(window),
                monthly_forecast: (total_quantity * 30).div_ceil(window),
                category: catalog.by_id(id).map(|meal| meal.category.clone()),
            }
        })
        .collect();

    forecast.sort_by(|a, b| b.monthly_forecast.cmp(&a.monthly_forecast));
    forecast
}
