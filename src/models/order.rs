//! Order records as written by the checkout flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const fn default_quantity() -> u32 {
    1
}

/// Delivery and contact details attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    /// Customer display name
    pub name: String,
    /// Email address; doubles as the user id for recommendations
    pub email: String,
    /// Street address
    pub street: String,
    /// Postal code
    #[serde(rename = "postal-code")]
    pub postal_code: String,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Meal id; may dangle if the meal was removed from the catalog
    pub id: String,
    /// Meal name at the time of ordering
    #[serde(default)]
    pub name: String,
    /// Unit price in major currency units
    #[serde(default, deserialize_with = "super::price::deserialize")]
    pub price: f64,
    /// Number of units, at least 1
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl OrderItem {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Unique order id
    pub id: String,
    /// Who ordered
    #[serde(default)]
    pub customer: Customer,
    /// Ordered lines
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Creation time; legacy records may not have one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Whether the kitchen marked the order done
    #[serde(default)]
    pub completed: bool,
    /// When `completed` flipped to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Whether this order was placed by `email`.
    #[must_use]
    pub fn placed_by(&self, email: &str) -> bool {
        self.customer.email == email
    }
}
