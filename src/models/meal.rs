//! Meal records - the catalog entries offered by the storefront.

use serde::{Deserialize, Serialize};

fn default_category() -> String {
    "other".to_string()
}

/// A meal offered in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    /// Unique catalog id (e.g. `"m1"`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Price in major currency units (`12.99`); the gateway charges `price * 100`
    #[serde(default, deserialize_with = "super::price::deserialize")]
    pub price: f64,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Image path relative to the static asset root
    #[serde(default)]
    pub image: String,
    /// Cuisine/category used for cart affinity and favorite cuisines
    #[serde(default = "default_category")]
    pub category: String,
    /// Tags such as `"vegetarian"`, `"healthy"` or `"popular"`
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared allergens; `None` means the meal carries no allergen data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
    /// Nutrition facts, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
}

/// Per-serving nutrition facts. Missing fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionalInfo {
    /// kcal
    pub calories: f64,
    /// grams
    pub protein: f64,
    /// grams
    pub carbs: f64,
    /// grams
    pub fat: f64,
    /// grams
    pub fiber: f64,
}

impl MealRecord {
    /// Whether the meal carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether any declared allergen appears in `allergies`.
    ///
    /// Meals without allergen data never match.
    #[must_use]
    pub fn contains_any_allergen(&self, allergies: &[String]) -> bool {
        self.allergens
            .as_ref()
            .is_some_and(|allergens| allergens.iter().any(|a| allergies.contains(a)))
    }
}
