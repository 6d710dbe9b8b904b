//! JSON data-directory store.
//!
//! Each collection is one pretty-printed JSON array on disk. Writes go to a
//! sibling temp file first and are renamed into place, so a reader sees either
//! the old array or the new one. Two writers doing read-modify-write at the
//! same time can still lose one update.

use super::{Collection, CollectionStore};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Stores collections as `<data_dir>/<collection file>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Uses `data_dir` as-is; it must already exist for writes to succeed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Creates `data_dir` (and parents) if needed and returns a store rooted there.
    ///
    /// # Errors
    /// Returns [`Error::StoreUnavailable`] if the directory cannot be created.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await.map_err(|e| {
            Error::store_unavailable(
                "data-dir",
                format!("failed to create {}: {e}", data_dir.display()),
            )
        })?;
        info!("Data directory is ready: {}", data_dir.display());
        Ok(Self { data_dir })
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }
}

#[async_trait]
impl CollectionStore for JsonFileStore {
    #[instrument(skip(self))]
    async fn read(&self, collection: Collection) -> Result<Vec<Value>> {
        let path = self.path_for(collection);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, reading as empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::store_unavailable(
                    collection.name(),
                    format!("failed to read {}: {e}", path.display()),
                ));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            Error::store_unavailable(
                collection.name(),
                format!("{} is not a JSON array: {e}", path.display()),
            )
        })
    }

    #[instrument(skip(self, records))]
    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<()> {
        let path = self.path_for(collection);
        let tmp_path = path.with_extension("json.tmp");

        let body = serde_json::to_string_pretty(&records)
            .map_err(|e| Error::store_unavailable(collection.name(), e))?;

        fs::write(&tmp_path, body).await.map_err(|e| {
            Error::store_unavailable(
                collection.name(),
                format!("failed to write {}: {e}", tmp_path.display()),
            )
        })?;
        fs::rename(&tmp_path, &path).await.map_err(|e| {
            Error::store_unavailable(
                collection.name(),
                format!("failed to replace {}: {e}", path.display()),
            )
        })?;

        debug!("Replaced {} with {} records", path.display(), records.len());
        Ok(())
    }
}
