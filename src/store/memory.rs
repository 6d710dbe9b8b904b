//! In-memory collection store for tests and dry runs.

use super::{Collection, CollectionStore};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;

/// Keeps every collection in a map guarded by an async `RwLock`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Value>>>>,
    unavailable: Arc<RwLock<HashSet<Collection>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read and write of `collection` fail with
    /// [`Error::StoreUnavailable`], simulating a corrupt file.
    pub async fn mark_unavailable(&self, collection: Collection) {
        self.unavailable.write().await.insert(collection);
    }

    async fn check_available(&self, collection: Collection) -> Result<()> {
        if self.unavailable.read().await.contains(&collection) {
            return Err(Error::store_unavailable(
                collection.name(),
                "collection marked unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn read(&self, collection: Collection) -> Result<Vec<Value>> {
        self.check_available(collection).await?;
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<()> {
        self.check_available(collection).await?;
        let mut collections = self.collections.write().await;
        collections.insert(collection, records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unwritten_collection_reads_empty() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.read(Collection::Meals).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_replaces_whole_collection() -> Result<()> {
        let store = MemoryStore::new();
        store
            .write(Collection::Meals, vec![json!({"id": "m1"}), json!({"id": "m2"})])
            .await?;
        store.write(Collection::Meals, vec![json!({"id": "m3"})]).await?;

        let meals = store.read(Collection::Meals).await?;
        assert_eq!(meals, vec![json!({"id": "m3"})]);
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_state() -> Result<()> {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.write(Collection::Orders, vec![json!({"id": "o1"})]).await?;
        assert_eq!(store.read(Collection::Orders).await?.len(), 1);
        Ok(())
    }
}
