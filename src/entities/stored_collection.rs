//! Stored collection entity - one row per named collection.
//!
//! The whole collection is kept as a JSON array in `body`, mirroring the
//! one-file-per-collection layout of the JSON data directory.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored collection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_collections")]
pub struct Model {
    /// Collection name (e.g. `"orders"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// JSON array of records
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Number of records in `body`, kept for quick inspection
    pub record_count: i64,
    /// When the collection was last replaced
    pub updated_at: DateTime,
}

/// `StoredCollection` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
