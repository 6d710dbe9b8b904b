//! Order book business logic.
//!
//! Placement, listing, completion and deletion of orders. All writes are a
//! read-modify-write of the whole orders collection.

use crate::{
    errors::{Error, Result},
    models::{Customer, OrderItem, OrderRecord},
    store::{self, Collection, CollectionStore},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// An order as submitted by the storefront, before it gets an id and a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Delivery and contact details
    pub customer: Customer,
    /// Ordered lines
    pub items: Vec<OrderItem>,
}

/// Checks that an order can be placed.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if:
/// - There are no items, or an item has quantity 0
/// - The email has no `@`
/// - Name, street or postal code is blank
pub fn validate_new_order(order: &NewOrder) -> Result<()> {
    if order.items.is_empty() {
        return Err(Error::invalid_input("Missing data: order has no items"));
    }
    if let Some(item) = order.items.iter().find(|item| item.quantity == 0) {
        return Err(Error::invalid_input(format!(
            "Item {} must have a quantity of at least 1",
            item.id
        )));
    }

    let customer = &order.customer;
    let blank = |value: &str| value.trim().is_empty();
    if !customer.email.contains('@')
        || blank(&customer.name)
        || blank(&customer.street)
        || blank(&customer.postal_code)
    {
        return Err(Error::invalid_input(
            "Missing data: Email, name, street, postal code is missing.",
        ));
    }

    Ok(())
}

/// The demo order written by [`OrderBook::seed_sample_if_empty`].
fn sample_order() -> OrderRecord {
    OrderRecord {
        id: "test-order-1".to_string(),
        customer: Customer {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            street: "Test Street".to_string(),
            postal_code: "12345".to_string(),
        },
        items: vec![
            OrderItem {
                id: "m1".to_string(),
                name: "Mac & Cheese".to_string(),
                price: 100.0,
                quantity: 2,
            },
            OrderItem {
                id: "m2".to_string(),
                name: "Margherita Pizza".to_string(),
                price: 200.0,
                quantity: 1,
            },
        ],
        date: None,
        completed: false,
        completed_at: None,
    }
}

/// Reads and writes the orders collection.
#[derive(Clone)]
pub struct OrderBook {
    store: Arc<dyn CollectionStore>,
}

impl OrderBook {
    /// Creates an order book on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<OrderRecord>> {
        store::load_strict(self.store.as_ref(), Collection::Orders).await
    }

    async fn save(&self, orders: &[OrderRecord]) -> Result<()> {
        store::save(self.store.as_ref(), Collection::Orders, orders).await
    }

    /// All orders in stored order. Malformed records are skipped.
    pub async fn list(&self) -> Result<Vec<OrderRecord>> {
        store::load(self.store.as_ref(), Collection::Orders).await
    }

    /// Validates and appends a new order, stamped with a fresh id and the current time.
    #[instrument(skip(self, order), fields(email = %order.customer.email))]
    pub async fn place(&self, order: NewOrder) -> Result<OrderRecord> {
        validate_new_order(&order)?;

        let record = OrderRecord {
            id: Uuid::now_v7().to_string(),
            customer: order.customer,
            items: order.items,
            date: Some(Utc::now()),
            completed: false,
            completed_at: None,
        };

        let mut orders = self.load().await?;
        orders.push(record.clone());
        self.save(&orders).await?;

        info!("Order {} placed", record.id);
        Ok(record)
    }

    /// Marks an order as completed.
    ///
    /// `completedAt` is set only the first time; completing again changes nothing.
    #[instrument(skip(self))]
    pub async fn complete(&self, order_id: &str) -> Result<OrderRecord> {
        let mut orders = self.load().await?;
        let order = orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or_else(|| Error::not_found("Order", order_id))?;

        if order.completed {
            return Ok(order.clone());
        }

        order.completed = true;
        order.completed_at = Some(Utc::now());
        let completed = order.clone();
        self.save(&orders).await?;

        info!("Order {order_id} completed");
        Ok(completed)
    }

    /// Removes an order.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: &str) -> Result<()> {
        let mut orders = self.load().await?;
        let before = orders.len();
        orders.retain(|order| order.id != order_id);

        if orders.len() == before {
            return Err(Error::not_found("Order", order_id));
        }

        self.save(&orders).await?;
        info!("Order {order_id} deleted");
        Ok(())
    }

    /// Writes the demo order into an empty collection.
    ///
    /// Returns whether anything was written.
    pub async fn seed_sample_if_empty(&self) -> Result<bool> {
        if !self.load().await?.is_empty() {
            return Ok(false);
        }

        self.save(&[sample_order()]).await?;
        info!("Sample order created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{store::MemoryStore, test_utils::*};

    fn new_order(email: &str) -> NewOrder {
        let template = order("ignored", email, &[("m1", 2), ("m2", 1)]);
        NewOrder {
            customer: template.customer,
            items: template.items,
        }
    }

    fn book() -> OrderBook {
        OrderBook::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_place_assigns_id_and_date() -> Result<()> {
        let book = book();
        let placed = book.place(new_order("a@x.com")).await?;

        assert!(Uuid::parse_str(&placed.id).is_ok());
        assert!(placed.date.is_some());
        assert!(!placed.completed);
        assert_eq!(placed.total(), 300.0);

        let orders = book.list().await?;
        assert_eq!(orders, vec![placed]);
        Ok(())
    }

    #[tokio::test]
    async fn test_place_generates_distinct_ids() -> Result<()> {
        let book = book();
        let first = book.place(new_order("a@x.com")).await?;
        let second = book.place(new_order("a@x.com")).await?;
        assert_ne!(first.id, second.id);
        assert_eq!(book.list().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_place_rejects_invalid_orders() {
        let book = book();

        let mut no_items = new_order("a@x.com");
        no_items.items.clear();
        let mut bad_email = new_order("not-an-email");
        bad_email.customer.email = "not-an-email".to_string();
        let mut blank_street = new_order("a@x.com");
        blank_street.customer.street = "   ".to_string();
        let mut zero_quantity = new_order("a@x.com");
        zero_quantity.items[0].quantity = 0;

        for invalid in [no_items, bad_email, blank_street, zero_quantity] {
            let result = book.place(invalid).await;
            assert!(matches!(result, Err(Error::InvalidInput { .. })));
        }
        assert!(book.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_twice_keeps_first_timestamp() -> Result<()> {
        let book = book();
        let placed = book.place(new_order("a@x.com")).await?;

        let first = book.complete(&placed.id).await?;
        let second = book.complete(&placed.id).await?;

        assert!(first.completed);
        assert!(first.completed_at.is_some());
        assert_eq!(first.completed_at, second.completed_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_and_delete_unknown_order() {
        let book = book();
        assert!(matches!(
            book.complete("missing").await,
            Err(Error::NotFound { entity: "Order", .. })
        ));
        assert!(matches!(
            book.delete("missing").await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_order() -> Result<()> {
        let book = book();
        let keep = book.place(new_order("a@x.com")).await?;
        let removed = book.place(new_order("b@x.com")).await?;

        book.delete(&removed.id).await?;
        assert_eq!(book.list().await?, vec![keep]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_only_into_empty_collection() -> Result<()> {
        let book = book();
        assert!(book.seed_sample_if_empty().await?);
        assert!(!book.seed_sample_if_empty().await?);

        let orders = book.list().await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer.email, "test@example.com");
        assert_eq!(orders[0].total(), 400.0);
        Ok(())
    }
}
