//! Admin allow-list check for the dashboard.

use crate::{
    config::AdminConfig,
    errors::{Error, Result},
};
use std::collections::HashSet;
use tracing::warn;

/// Grants dashboard access to a fixed set of emails.
#[derive(Debug, Clone, Default)]
pub struct AdminGuard {
    emails: HashSet<String>,
}

impl AdminGuard {
    /// Creates a guard admitting exactly `emails`. Matching is case-sensitive.
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `email` is on the allow-list.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        !email.trim().is_empty() && self.emails.contains(email)
    }

    /// Fails with [`Error::Forbidden`] unless `email` is on the allow-list.
    pub fn authorize(&self, email: &str) -> Result<()> {
        if self.is_admin(email) {
            Ok(())
        } else {
            warn!("Rejected dashboard access for '{email}'");
            Err(Error::Forbidden)
        }
    }
}

impl From<&AdminConfig> for AdminGuard {
    fn from(config: &AdminConfig) -> Self {
        Self::new(config.emails.iter().cloned())
    }
}
