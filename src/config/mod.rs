/// Application configuration loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AdminConfig, AppConfig, StorageBackend, StorageConfig, load_config, load_or_default};
