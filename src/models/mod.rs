//! Record types stored in the collections.
//! Field names follow the JSON the storefront writes (camelCase, `postal-code`).

pub mod meal;
pub mod order;
pub mod payment;
pub mod preference;
pub mod price;

pub use meal::{MealRecord, NutritionalInfo};
pub use order::{Customer, OrderItem, OrderRecord};
pub use payment::PaymentRecord;
pub use preference::{PreferenceRecord, PreferenceUpdate};
