//! `SQLite` collection store backed by `SeaORM`.
//!
//! Each collection is a single row in `stored_collections`; replacing a
//! collection rewrites that row.

use super::{Collection, CollectionStore};
use crate::{
    config::database,
    entities::{StoredCollection, stored_collection},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde_json::Value;
use tracing::{debug, instrument};

/// Collection store keeping one JSON document per collection in `SQLite`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Connects to `database_url` and creates the tables if needed.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = database::create_connection(database_url).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl CollectionStore for SqliteStore {
    #[instrument(skip(self))]
    async fn read(&self, collection: Collection) -> Result<Vec<Value>> {
        let row = StoredCollection::find_by_id(collection.name().to_string())
            .one(&self.db)
            .await
            .map_err(|e| Error::store_unavailable(collection.name(), e))?;

        match row {
            Some(row) => serde_json::from_str(&row.body).map_err(|e| {
                Error::store_unavailable(collection.name(), format!("body is not a JSON array: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, records))]
    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<()> {
        let body = serde_json::to_string(&records)
            .map_err(|e| Error::store_unavailable(collection.name(), e))?;
        let record_count = i64::try_from(records.len()).unwrap_or(i64::MAX);
        let now = Utc::now().naive_utc();

        let existing = StoredCollection::find_by_id(collection.name().to_string())
            .one(&self.db)
            .await?;

        if let Some(row) = existing {
            // Update existing row
            let mut active_model: stored_collection::ActiveModel = row.into();
            active_model.body = Set(body);
            active_model.record_count = Set(record_count);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            // Insert new row
            let new_row = stored_collection::ActiveModel {
                name: Set(collection.name().to_string()),
                body: Set(body),
                record_count: Set(record_count),
                updated_at: Set(now),
            };
            new_row.insert(&self.db).await?;
        }

        debug!(%collection, record_count, "Collection row replaced");
        Ok(())
    }
}
