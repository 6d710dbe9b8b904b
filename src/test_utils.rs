//! Shared test utilities for meal-buddy.
//!
//! Builders for meals, orders and payments with sensible defaults, plus a
//! memory store pre-filled with them and a fake payment gateway.

#![allow(clippy::unwrap_used)]

use crate::{
    core::payments::{CheckoutLine, CheckoutSession, PaymentGateway, PaymentStatus, SessionStatus},
    errors::{Error, Result},
    models::{Customer, MealRecord, NutritionalInfo, OrderItem, OrderRecord, PaymentRecord},
    store::{self, Collection, MemoryStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a meal with sensible defaults.
///
/// # Defaults
/// * `name`: `"Meal <id>"`
/// * `price`: 100
/// * no tags, allergens or nutrition facts
pub fn meal(id: &str, category: &str) -> MealRecord {
    MealRecord {
        id: id.to_string(),
        name: format!("Meal {id}"),
        price: 100.0,
        description: String::new(),
        image: format!("images/{id}.jpg"),
        category: category.to_string(),
        tags: Vec::new(),
        allergens: None,
        nutritional_info: None,
    }
}

/// Creates a meal carrying `tags`.
pub fn meal_with(id: &str, category: &str, tags: &[&str]) -> MealRecord {
    MealRecord {
        tags: tags.iter().map(ToString::to_string).collect(),
        ..meal(id, category)
    }
}

/// Attaches nutrition facts to `meal`. Carbs are left at zero since they do not
/// affect any score.
pub fn with_nutrition(
    meal: MealRecord,
    calories: f64,
    protein: f64,
    fat: f64,
    fiber: f64,
) -> MealRecord {
    MealRecord {
        nutritional_info: Some(NutritionalInfo {
            calories,
            protein,
            carbs: 0.0,
            fat,
            fiber,
        }),
        ..meal
    }
}

/// Creates a customer with a valid address for `email`.
pub fn customer(email: &str) -> Customer {
    Customer {
        name: format!("Customer {email}"),
        email: email.to_string(),
        street: "Test Street 1".to_string(),
        postal_code: "12345".to_string(),
    }
}

/// Creates an undated order from `(meal id, quantity)` pairs, each line priced at 100.
pub fn order(id: &str, email: &str, items: &[(&str, u32)]) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        customer: customer(email),
        items: items
            .iter()
            .map(|&(meal_id, quantity)| OrderItem {
                id: meal_id.to_string(),
                name: format!("Meal {meal_id}"),
                price: 100.0,
                quantity,
            })
            .collect(),
        date: None,
        completed: false,
        completed_at: None,
    }
}

/// Like [`order`] but dated.
pub fn dated_order(
    id: &str,
    email: &str,
    items: &[(&str, u32)],
    date: DateTime<Utc>,
) -> OrderRecord {
    OrderRecord {
        date: Some(date),
        ..order(id, email, items)
    }
}

/// Creates a payment in INR.
pub fn payment(id: &str, amount_total: i64, date: Option<DateTime<Utc>>) -> PaymentRecord {
    PaymentRecord {
        id: id.to_string(),
        amount_total,
        currency: "inr".to_string(),
        customer_email: None,
        date,
    }
}

/// Builds a memory store holding the given meals, orders and payments.
pub async fn store_with(
    meals: &[MealRecord],
    orders: &[OrderRecord],
    payments: &[PaymentRecord],
) -> Result<MemoryStore> {
    let memory = MemoryStore::new();
    store::save(&memory, Collection::Meals, meals).await?;
    store::save(&memory, Collection::Orders, orders).await?;
    store::save(&memory, Collection::Payments, payments).await?;
    Ok(memory)
}

/// Payment gateway fake: sessions are created unpaid and flipped with
/// [`FakeGateway::mark_paid`].
#[derive(Debug, Default)]
pub struct FakeGateway {
    sessions: Mutex<HashMap<String, SessionStatus>>,
    next_id: AtomicUsize,
}

impl FakeGateway {
    /// Marks `session_id` as paid.
    pub fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(session_id) {
            session.payment_status = PaymentStatus::Paid;
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, lines: &[CheckoutLine]) -> Result<CheckoutSession> {
        let id = format!("cs_test_{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let amount_total = lines.iter().map(CheckoutLine::total).sum();

        self.sessions.lock().unwrap().insert(
            id.clone(),
            SessionStatus {
                id: id.clone(),
                payment_status: PaymentStatus::Unpaid,
                amount_total,
                currency: "inr".to_string(),
                customer_email: Some("buyer@example.com".to_string()),
            },
        );

        Ok(CheckoutSession { id, url: None })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus> {
        let sessions = self.sessions.lock().unwrap();
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::PaymentGateway {
                message: format!("No such checkout session: {session_id}"),
            })
    }
}
