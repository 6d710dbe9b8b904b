//! Core business logic, independent of the CLI.
//!
//! Every service holds an `Arc<dyn CollectionStore>` and reads what it needs
//! fresh on each call.

pub mod admin;
pub mod analytics;
pub mod catalog;
pub mod orders;
pub mod payments;
pub mod preferences;
pub mod recommendation;
pub mod scoring;

pub use admin::AdminGuard;
pub use analytics::AnalyticsAggregator;
pub use catalog::Catalog;
pub use orders::{NewOrder, OrderBook};
pub use payments::{PaymentGateway, PaymentLedger};
pub use preferences::PreferenceStore;
pub use recommendation::{CartItem, RecommendationEngine};
pub use scoring::SalesPeriod;
