//! Application configuration loading from config.toml
//!
//! The config file selects the storage backend and lists the admin accounts
//! allowed to read the dashboard. Every section is optional; a missing file
//! falls back to the JSON data directory under `./data`.

use super::database::{DEFAULT_DATABASE_URL, get_database_url};
use crate::{
    errors::{Error, Result},
    store::{CollectionStore, JsonFileStore, SqliteStore},
};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Where collections are persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Dashboard access control
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Which [`CollectionStore`] implementation to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection in `data_dir`
    #[default]
    Json,
    /// One row per collection in the `SQLite` database at `database_url`
    Sqlite,
}

/// `[storage]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selection
    pub backend: StorageBackend,
    /// Directory of the JSON backend
    pub data_dir: PathBuf,
    /// Connection URL of the `SQLite` backend
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[admin]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdminConfig {
    /// Emails allowed to read the admin dashboard
    pub emails: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            emails: vec!["admin@example.com".to_string()],
        }
    }
}

impl AppConfig {
    /// Replaces storage locations with explicitly provided values.
    ///
    /// Used for `MEAL_BUDDY_DATA_DIR` / `DATABASE_URL` overrides.
    pub fn apply_overrides(&mut self, data_dir: Option<String>, database_url: Option<String>) {
        if let Some(dir) = data_dir {
            debug!("Overriding data_dir with {dir}");
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = database_url {
            debug!("Overriding database_url");
            self.storage.database_url = url;
        }
    }

    /// Applies `MEAL_BUDDY_DATA_DIR` and `DATABASE_URL` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("MEAL_BUDDY_DATA_DIR").ok(),
            get_database_url(),
        );
    }

    /// Opens the configured collection store.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the database
    /// cannot be opened.
    pub async fn open_store(&self) -> Result<Arc<dyn CollectionStore>> {
        match self.storage.backend {
            StorageBackend::Json => {
                let store = JsonFileStore::open(&self.storage.data_dir).await?;
                Ok(Arc::new(store))
            }
            StorageBackend::Sqlite => {
                info!("Opening SQLite collection store");
                let store = SqliteStore::connect(&self.storage.database_url).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads `path` if it exists, otherwise returns the defaults, then applies
/// environment overrides.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    let mut config = if path_ref.exists() {
        load_config(path_ref)?
    } else {
        info!(
            "No config file at {}, using defaults",
            path_ref.display()
        );
        AppConfig::default()
    };
    config.apply_env_overrides();
    Ok(config)
}
