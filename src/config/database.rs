//! Database configuration for the `SQLite` collection store.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs.

use crate::entities::StoredCollection;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default location of the `SQLite` database when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/meal_buddy.sqlite?mode=rwc";

/// Gets the database URL from the environment, if set.
#[must_use]
pub fn get_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Opens a connection to `database_url` and makes sure all tables exist.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates the `stored_collections` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut collection_table = schema.create_table_from_entity(StoredCollection);
    collection_table.if_not_exists();

    db.execute(builder.build(&collection_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StoredCollectionModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Table exists and is queryable
        let _: Vec<StoredCollectionModel> = StoredCollection::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        let _: Vec<StoredCollectionModel> = StoredCollection::find().limit(1).all(&db).await?;
        Ok(())
    }
}
