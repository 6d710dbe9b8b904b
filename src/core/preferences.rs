//! User preference business logic.
//!
//! Preferences are keyed by user id (the account email). Users that never saved
//! anything get a zero-valued record which is not persisted until their first
//! update.

use crate::{
    errors::{Error, Result},
    models::{PreferenceRecord, PreferenceUpdate},
    store::{self, Collection, CollectionStore},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Reads and upserts [`PreferenceRecord`]s.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn CollectionStore>,
}

impl PreferenceStore {
    /// Creates a preference store on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Returns the stored preferences of `user_id`, or the default record.
    ///
    /// A collection that cannot be read also yields the default record.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> PreferenceRecord {
        match store::load::<PreferenceRecord>(self.store.as_ref(), Collection::UserPreferences).await
        {
            Ok(records) => records
                .into_iter()
                .find(|record| record.user_id == user_id)
                .unwrap_or_else(|| PreferenceRecord::default_for(user_id)),
            Err(e) => {
                warn!("Error reading user preferences: {e}");
                PreferenceRecord::default_for(user_id)
            }
        }
    }

    /// Merges `update` into the preferences of `user_id` and persists them.
    ///
    /// Fields absent from `update` keep their stored value; unknown users are
    /// appended.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `user_id` is blank
    /// - The preferences collection cannot be read or written
    #[instrument(skip(self, update))]
    pub async fn upsert(&self, user_id: &str, update: PreferenceUpdate) -> Result<PreferenceRecord> {
        if user_id.trim().is_empty() {
            return Err(Error::invalid_input("User ID is required"));
        }

        let mut records: Vec<PreferenceRecord> =
            store::load_strict(self.store.as_ref(), Collection::UserPreferences).await?;

        let updated = if let Some(existing) = records.iter_mut().find(|r| r.user_id == user_id) {
            update.apply_to(existing);
            existing.clone()
        } else {
            let mut record = PreferenceRecord::default_for(user_id);
            update.apply_to(&mut record);
            records.push(record.clone());
            record
        };

        store::save(self.store.as_ref(), Collection::UserPreferences, &records).await?;
        info!("Preferences updated for {user_id}");
        Ok(updated)
    }
}
