//! Meal catalog - indexed snapshot of the meals collection.
//!
//! A catalog is loaded fresh for every computation and dropped afterwards; it
//! never outlives the request that built it.

use crate::{
    errors::Result,
    models::MealRecord,
    store::{self, Collection, CollectionStore},
};
use std::collections::HashMap;

/// Meals in stored order plus an id index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    meals: Vec<MealRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from meals in their stored order.
    ///
    /// If two meals share an id the first one wins lookups.
    #[must_use]
    pub fn from_meals(meals: Vec<MealRecord>) -> Self {
        let mut index = HashMap::with_capacity(meals.len());
        for (position, meal) in meals.iter().enumerate() {
            index.entry(meal.id.clone()).or_insert(position);
        }
        Self { meals, index }
    }

    /// Reads the meals collection.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::StoreUnavailable`] if the collection cannot be read.
    pub async fn load(store: &dyn CollectionStore) -> Result<Self> {
        let meals = store::load(store, Collection::Meals).await?;
        Ok(Self::from_meals(meals))
    }

    /// All meals in catalog order.
    #[must_use]
    pub fn list(&self) -> &[MealRecord] {
        &self.meals
    }

    /// Looks up a meal by id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&MealRecord> {
        self.index.get(id).map(|&position| &self.meals[position])
    }
}
