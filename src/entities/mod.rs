//! Entity module - `SeaORM` entity definitions for the `SQLite` collection store.

pub mod stored_collection;

pub use stored_collection::{Entity as StoredCollection, Model as StoredCollectionModel};
