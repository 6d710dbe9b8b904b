//! Per-user dietary preferences.

use serde::{Deserialize, Serialize};

/// Stored preferences for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    /// User key, normally the account email
    pub user_id: String,
    /// Matched against meal tags (e.g. `"vegan"`)
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    /// Matched against meal allergens
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Matched against meal categories
    #[serde(default)]
    pub favorite_cuisines: Vec<String>,
}

impl PreferenceRecord {
    /// The zero-valued record handed out for users that never saved preferences.
    #[must_use]
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    /// Replacement dietary preferences
    #[serde(default)]
    pub dietary_preferences: Option<Vec<String>>,
    /// Replacement allergies
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    /// Replacement favorite cuisines
    #[serde(default)]
    pub favorite_cuisines: Option<Vec<String>>,
}

impl PreferenceUpdate {
    /// Applies the present fields onto `record`.
    pub fn apply_to(self, record: &mut PreferenceRecord) {
        if let Some(diet) = self.dietary_preferences {
            record.dietary_preferences = diet;
        }
        if let Some(allergies) = self.allergies {
            record.allergies = allergies;
        }
        if let Some(cuisines) = self.favorite_cuisines {
            record.favorite_cuisines = cuisines;
        }
    }
}
