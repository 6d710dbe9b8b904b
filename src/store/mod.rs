//! Collection store abstraction.
//!
//! Every piece of persisted state lives in one of a handful of named collections,
//! each an ordered array of JSON records that is read and replaced as a whole.
//! Services only talk to the [`CollectionStore`] trait so they can run against the
//! JSON data directory, a `SQLite` database, or an in-memory fake in tests.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// The named collections the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Placed orders
    Orders,
    /// The meal catalog
    Meals,
    /// Successful payments reported by the gateway
    Payments,
    /// Per-user dietary preferences
    UserPreferences,
}

impl Collection {
    /// Logical collection name, also the `SQLite` row key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Meals => "meals",
            Self::Payments => "success-payments",
            Self::UserPreferences => "user-preferences",
        }
    }

    /// File name inside the JSON data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Orders => "orders.json",
            Self::Meals => "available-meals.json",
            Self::Payments => "success.json",
            Self::UserPreferences => "user-preferences.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-collection read/replace storage.
///
/// A collection that was never written reads as empty. Implementations must not
/// cache: every `read` reflects the latest successful `write`.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Returns every record of `collection` in stored order.
    async fn read(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Replaces the contents of `collection` with `records`.
    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<()>;
}

/// Reads `collection` and deserializes each record into `T`.
///
/// Records that do not fit `T` are skipped with a warning instead of failing the
/// whole read; only an unreadable collection is an error.
pub async fn load<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: Collection,
) -> Result<Vec<T>> {
    let raw = store.read(collection).await?;
    let total = raw.len();

    let records: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(%collection, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    debug!(%collection, total, loaded = records.len(), "Loaded collection");
    Ok(records)
}

/// Reads `collection` for a read-modify-write cycle.
///
/// Unlike [`load`], a record that does not fit `T` is an error: rewriting the
/// collection would otherwise silently drop it.
pub async fn load_strict<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: Collection,
) -> Result<Vec<T>> {
    store
        .read(collection)
        .await?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| {
                Error::store_unavailable(collection.name(), format!("record {index}: {e}"))
            })
        })
        .collect()
}

/// Like [`load`], but an unreadable collection is logged and treated as empty.
pub async fn load_or_empty<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: Collection,
) -> Vec<T> {
    match load(store, collection).await {
        Ok(records) => records,
        Err(e) => {
            warn!(%collection, error = %e, "Collection unavailable, using empty data");
            Vec::new()
        }
    }
}

/// Serializes `records` and replaces `collection` with them.
pub async fn save<T: Serialize>(
    store: &dyn CollectionStore,
    collection: Collection,
    records: &[T],
) -> Result<()> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::store_unavailable(collection.name(), e))?;
    store.write(collection, values).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::OrderRecord;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_skips_malformed_records() -> Result<()> {
        let store = MemoryStore::new();
        store
            .write(
                Collection::Orders,
                vec![
                    json!({"id": "o1", "items": [{"id": "m1", "price": 100, "quantity": 1}]}),
                    json!("not an order"),
                    json!({"id": "o2"}),
                ],
            )
            .await?;

        let orders: Vec<OrderRecord> = load(&store, Collection::Orders).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, "o1");
        assert_eq!(orders[1].id, "o2");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_strict_rejects_malformed_records() -> Result<()> {
        let store = MemoryStore::new();
        store
            .write(Collection::Orders, vec![json!({"id": "o1"}), json!(42)])
            .await?;

        let result = load_strict::<OrderRecord>(&store, Collection::Orders).await;
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_or_empty_swallows_unavailable_collection() {
        let store = MemoryStore::new();
        store.mark_unavailable(Collection::Payments).await;

        let orders: Vec<OrderRecord> = load_or_empty(&store, Collection::Payments).await;
        assert!(orders.is_empty());
        assert!(load::<OrderRecord>(&store, Collection::Payments).await.is_err());
    }

    #[test]
    fn test_collection_file_names_match_storefront_layout() {
        assert_eq!(Collection::Meals.file_name(), "available-meals.json");
        assert_eq!(Collection::Payments.file_name(), "success.json");
        assert_eq!(Collection::UserPreferences.to_string(), "user-preferences");
    }
}
