//! Successful payment records, one per paid gateway session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payment the gateway reported as paid. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Gateway session id; matches an order id only when checkout reused it
    pub id: String,
    /// Charged amount in minor currency units
    #[serde(default)]
    pub amount_total: i64,
    /// ISO currency code as reported by the gateway
    #[serde(default)]
    pub currency: String,
    /// Email the gateway collected, if any
    #[serde(default)]
    pub customer_email: Option<String>,
    /// When the payment was recorded
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// The charged amount in major currency units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn amount_major(&self) -> f64 {
        self.amount_total as f64 / 100.0
    }
}
