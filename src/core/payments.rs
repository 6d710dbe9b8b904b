//! Checkout and payment confirmation.
//!
//! The hosted payment page lives behind the [`PaymentGateway`] trait. A checkout
//! creates a gateway session; once the customer paid, [`PaymentLedger::confirm`]
//! records the session in the payments collection that feeds the dashboard.

use crate::{
    core::{catalog::Catalog, recommendation::CartItem},
    errors::{Error, Result},
    models::PaymentRecord,
    store::{self, Collection, CollectionStore},
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One line of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    /// Product name shown on the payment page
    pub name: String,
    /// Product image shown on the payment page
    pub image: String,
    /// Minor currency units per unit
    pub unit_amount: i64,
    /// Number of units
    pub quantity: u32,
}

impl CheckoutLine {
    /// `unit_amount * quantity`
    #[must_use]
    pub fn total(&self) -> i64 {
        self.unit_amount * i64::from(self.quantity)
    }
}

/// A session created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session id
    pub id: String,
    /// Hosted payment page, if the gateway provides one
    pub url: Option<String>,
}

/// Payment state of a gateway session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds captured
    Paid,
    /// Customer has not paid (yet)
    Unpaid,
    /// Nothing to charge, e.g. a zero total
    NoPaymentRequired,
}

/// What the gateway reports about a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Gateway session id
    pub id: String,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Charged amount, minor currency units
    pub amount_total: i64,
    /// ISO currency code
    pub currency: String,
    /// Email collected on the payment page
    pub customer_email: Option<String>,
}

/// A hosted checkout provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment session for `lines`.
    async fn create_checkout_session(&self, lines: &[CheckoutLine]) -> Result<CheckoutSession>;

    /// Looks up the current state of a session.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus>;
}

/// Converts a major-unit price to minor units, rounded to the nearest cent.
#[allow(clippy::cast_possible_truncation)]
fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Turns cart entries into checkout lines priced from the catalog.
///
/// Meal prices are major currency units; the gateway expects minor units.
///
/// # Errors
/// Returns [`Error::NotFound`] for cart entries that are not in the catalog.
pub fn checkout_lines(items: &[CartItem], catalog: &Catalog) -> Result<Vec<CheckoutLine>> {
    items
        .iter()
        .map(|item| {
            let meal = catalog
                .by_id(&item.id)
                .ok_or_else(|| Error::not_found("Meal", item.id.as_str()))?;
            Ok(CheckoutLine {
                name: meal.name.clone(),
                image: meal.image.clone(),
                unit_amount: to_minor_units(meal.price),
                quantity: item.quantity,
            })
        })
        .collect()
}

/// Opens a checkout session for `lines`.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `lines` is empty, or whatever the gateway reports.
#[instrument(skip(gateway, lines), fields(line_count = lines.len()))]
pub async fn start_checkout(
    gateway: &dyn PaymentGateway,
    lines: &[CheckoutLine],
) -> Result<CheckoutSession> {
    if lines.is_empty() {
        return Err(Error::invalid_input("No products provided"));
    }

    gateway
        .create_checkout_session(lines)
        .await
        .inspect(|session| info!("Checkout session {} created", session.id))
        .inspect_err(|e| warn!("Error creating checkout session: {e}"))
}

/// Reads and appends to the payments collection.
#[derive(Clone)]
pub struct PaymentLedger {
    store: Arc<dyn CollectionStore>,
}

impl PaymentLedger {
    /// Creates a ledger on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// All recorded payments.
    pub async fn list(&self) -> Result<Vec<PaymentRecord>> {
        store::load(self.store.as_ref(), Collection::Payments).await
    }

    /// Records a paid session.
    ///
    /// Confirming a session that is already recorded returns the stored record
    /// without writing a duplicate.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The gateway does not report the session as paid ([`Error::PaymentIncomplete`])
    /// - The gateway lookup fails
    /// - The payments collection cannot be read or written
    #[instrument(skip(self, gateway))]
    pub async fn confirm(
        &self,
        gateway: &dyn PaymentGateway,
        session_id: &str,
    ) -> Result<PaymentRecord> {
        let session = gateway.retrieve_session(session_id).await?;
        if session.payment_status != PaymentStatus::Paid {
            return Err(Error::PaymentIncomplete {
                session_id: session_id.to_string(),
            });
        }

        let mut payments: Vec<PaymentRecord> =
            store::load_strict(self.store.as_ref(), Collection::Payments).await?;
        if let Some(existing) = payments.iter().find(|payment| payment.id == session.id) {
            info!("Session {session_id} already recorded");
            return Ok(existing.clone());
        }

        let record = PaymentRecord {
            id: session.id,
            amount_total: session.amount_total,
            currency: session.currency,
            customer_email: session.customer_email,
            date: Some(Utc::now()),
        };
        payments.push(record.clone());
        store::save(self.store.as_ref(), Collection::Payments, &payments).await?;

        info!("Payment {} recorded", record.id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, test_utils::*};

    #[test]
    fn test_checkout_lines_price_in_minor_units() -> Result<()> {
        let mut pizza = meal("m1", "italian");
        pizza.price = 250.0;
        let catalog = Catalog::from_meals(vec![pizza]);

        let lines = checkout_lines(
            &[CartItem {
                id: "m1".to_string(),
                quantity: 2,
            }],
            &catalog,
        )?;
        assert_eq!(lines[0].unit_amount, 25_000);
        assert_eq!(lines[0].total(), 50_000);
        assert_eq!(lines[0].image, "images/m1.jpg");

        assert!(matches!(
            checkout_lines(&[CartItem::new("ghost")], &catalog),
            Err(Error::NotFound { entity: "Meal", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_checkout_lines_round_fractional_prices() -> Result<()> {
        let mut pizza = meal("m1", "italian");
        pizza.price = 12.99;
        let catalog = Catalog::from_meals(vec![pizza]);

        let lines = checkout_lines(&[CartItem::new("m1")], &catalog)?;
        assert_eq!(lines[0].unit_amount, 1299);
        Ok(())
    }

    #[tokio::test]
    async fn test_start_checkout_requires_lines() {
        let gateway = FakeGateway::default();
        assert!(matches!(
            start_checkout(&gateway, &[]).await,
            Err(Error::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_confirm_unpaid_session_is_incomplete() -> Result<()> {
        let gateway = FakeGateway::default();
        let lines = checkout_lines(&[CartItem::new("m1")], &Catalog::from_meals(vec![meal("m1", "a")]))?;
        let session = start_checkout(&gateway, &lines).await?;

        let ledger = PaymentLedger::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            ledger.confirm(&gateway, &session.id).await,
            Err(Error::PaymentIncomplete { .. })
        ));
        assert!(ledger.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_paid_session_twice_stores_one_payment() -> Result<()> {
        let gateway = FakeGateway::default();
        let lines = checkout_lines(&[CartItem::new("m1")], &Catalog::from_meals(vec![meal("m1", "a")]))?;
        let session = start_checkout(&gateway, &lines).await?;
        gateway.mark_paid(&session.id);

        let ledger = PaymentLedger::new(Arc::new(MemoryStore::new()));
        let first = ledger.confirm(&gateway, &session.id).await?;
        let second = ledger.confirm(&gateway, &session.id).await?;

        assert_eq!(first, second);
        assert_eq!(first.amount_total, 10_000);
        assert_eq!(first.customer_email.as_deref(), Some("buyer@example.com"));
        assert!(first.date.is_some());
        assert_eq!(ledger.list().await?, vec![first]);
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_unknown_session_surfaces_gateway_error() {
        let gateway = FakeGateway::default();
        let ledger = PaymentLedger::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            ledger.confirm(&gateway, "cs_missing").await,
            Err(Error::PaymentGateway { .. })
        ));
    }
}
