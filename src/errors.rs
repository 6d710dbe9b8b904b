//! Unified error types for meal-buddy.
//!
//! Every fallible operation in the crate returns [`Result`]. Recommendation and
//! analytics operations swallow most of these internally and degrade to empty
//! output; the record-keeping services propagate them.

use thiserror::Error;

/// Errors surfaced by the stores and services.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file missing fields or unparseable
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A collection could not be read or written
    #[error("Collection store unavailable ({collection}): {message}")]
    StoreUnavailable {
        /// Name of the collection
        collection: String,
        /// Underlying cause
        message: String,
    },

    /// Caller supplied something the operation cannot work with
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Which input was rejected and why
        message: String,
    },

    /// A record addressed by id does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("Order", "Meal", ...)
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The caller is not on the admin allow-list
    #[error("Access denied: admin privileges required")]
    Forbidden,

    /// The payment gateway reported the session as not yet paid
    #[error("Payment not completed for session {session_id}")]
    PaymentIncomplete {
        /// Gateway session id
        session_id: String,
    },

    /// The payment gateway itself failed
    #[error("Payment gateway error: {message}")]
    PaymentGateway {
        /// Gateway-provided detail
        message: String,
    },

    /// `SeaORM` database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding failed outside of a collection write
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`Error::StoreUnavailable`].
    pub fn store_unavailable(collection: impl Into<String>, message: impl ToString) -> Self {
        Self::StoreUnavailable {
            collection: collection.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
