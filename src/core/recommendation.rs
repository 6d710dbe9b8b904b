//! Recommendation business logic.
//!
//! Three kinds of suggestions are computed from the catalog, the order history
//! and the user's saved preferences:
//! - collaborative: meals ordered by users whose history overlaps the user's
//! - cart: meals that complement what is currently in the cart
//! - health: meals that fit the user's diet, ranked by nutrition
//!
//! Every computation reads its collections fresh. Apart from input validation,
//! failures are logged and turn into an empty list: callers should read "no
//! recommendations" rather than an error.

use crate::{
    core::{
        catalog::Catalog,
        preferences::PreferenceStore,
        scoring::{self, cart_affinity_score, health_score},
    },
    errors::{Error, Result},
    models::{MealRecord, OrderRecord, PreferenceRecord},
    store::{self, Collection, CollectionStore},
};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashSet},
    sync::Arc,
};
use tracing::{debug, error, instrument};

/// Maximum number of collaborative recommendations.
pub const USER_RECOMMENDATION_LIMIT: usize = 5;
/// Maximum number of cart recommendations.
pub const CART_RECOMMENDATION_LIMIT: usize = 3;
/// Maximum number of health recommendations.
pub const HEALTH_RECOMMENDATION_LIMIT: usize = 5;
/// Size of the popularity pool used for fallbacks and top-ups.
pub const POPULAR_POOL_SIZE: usize = 5;
/// Below this many collaborative hits, popular meals are mixed in.
const MIN_COLLABORATIVE_RESULTS: usize = 3;

const fn default_quantity() -> u32 {
    1
}

/// An entry of the shopping cart as sent by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Meal id
    pub id: String,
    /// Units in the cart
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartItem {
    /// Cart entry for a single unit of `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity: 1,
        }
    }
}

/// Computes meal recommendations against a collection store.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn CollectionStore>,
}

impl RecommendationEngine {
    /// Creates an engine reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Meals ordered by users with overlapping order history, at most 5.
    ///
    /// Users without orders get the most popular meals instead.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `user_id` is blank.
    #[instrument(skip(self))]
    pub async fn recommend_for_user(&self, user_id: &str) -> Result<Vec<MealRecord>> {
        require_user_id(user_id)?;

        let result = async {
            let orders: Vec<OrderRecord> = store::load(self.store.as_ref(), Collection::Orders).await?;
            let catalog = Catalog::load(self.store.as_ref()).await?;
            Ok::<_, Error>(collaborative_recommendations(user_id, &orders, &catalog))
        }
        .await;

        Ok(degrade("recommendations", result))
    }

    /// Meals that complement the cart, at most 3.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `user_id` is blank or the cart is empty.
    #[instrument(skip(self, cart_items), fields(cart_size = cart_items.len()))]
    pub async fn recommend_for_cart(
        &self,
        user_id: &str,
        cart_items: &[CartItem],
    ) -> Result<Vec<MealRecord>> {
        require_user_id(user_id)?;
        if cart_items.is_empty() {
            return Err(Error::invalid_input("Cart items are required"));
        }

        let result = async {
            let orders: Vec<OrderRecord> = store::load(self.store.as_ref(), Collection::Orders).await?;
            let catalog = Catalog::load(self.store.as_ref()).await?;
            Ok::<_, Error>(cart_recommendations(user_id, cart_items, &orders, &catalog))
        }
        .await;

        Ok(degrade("cart recommendations", result))
    }

    /// Meals matching the user's diet and allergies, ranked by health score, at most 5.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `user_id` is blank.
    #[instrument(skip(self))]
    pub async fn recommend_for_health(&self, user_id: &str) -> Result<Vec<MealRecord>> {
        require_user_id(user_id)?;

        let preferences = PreferenceStore::new(Arc::clone(&self.store))
            .get(user_id)
            .await;
        let result = Catalog::load(self.store.as_ref())
            .await
            .map(|catalog| health_recommendations(&preferences, &catalog));

        Ok(degrade("health recommendations", result))
    }
}

fn require_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::invalid_input("User ID is required"));
    }
    Ok(())
}

fn degrade(kind: &str, result: Result<Vec<MealRecord>>) -> Vec<MealRecord> {
    match result {
        Ok(meals) => {
            debug!("Returning {} {kind}", meals.len());
            meals
        }
        Err(e) => {
            error!("Error generating {kind}: {e}");
            Vec::new()
        }
    }
}

/// Collaborative filtering over the full order history.
///
/// 1. No own orders: the popularity ranking.
/// 2. Otherwise: users sharing at least one ordered meal are "similar"; their
///    meals the user never ordered are candidates, in ascending id order.
/// 3. With fewer than 3 candidates, popular meals the user never ordered are
///    appended in popularity order.
#[must_use]
pub fn collaborative_recommendations(
    user_id: &str,
    orders: &[OrderRecord],
    catalog: &Catalog,
) -> Vec<MealRecord> {
    let (own_orders, other_orders): (Vec<&OrderRecord>, Vec<&OrderRecord>) =
        orders.iter().partition(|order| order.placed_by(user_id));

    if own_orders.is_empty() {
        debug!("No past orders for {user_id}, returning popular items");
        return scoring::popular(orders, catalog, POPULAR_POOL_SIZE)
            .into_iter()
            .cloned()
            .collect();
    }

    let own_ids: HashSet<&str> = own_orders
        .iter()
        .flat_map(|order| order.items.iter().map(|item| item.id.as_str()))
        .collect();

    let similar_users: HashSet<&str> = other_orders
        .iter()
        .filter(|order| order.items.iter().any(|item| own_ids.contains(item.id.as_str())))
        .map(|order| order.customer.email.as_str())
        .collect();

    let candidate_ids: BTreeSet<&str> = other_orders
        .iter()
        .filter(|order| similar_users.contains(order.customer.email.as_str()))
        .flat_map(|order| order.items.iter().map(|item| item.id.as_str()))
        .filter(|id| !own_ids.contains(id))
        .collect();

    let mut picks: Vec<&MealRecord> = candidate_ids
        .iter()
        .filter_map(|id| catalog.by_id(id))
        .collect();

    if picks.len() < MIN_COLLABORATIVE_RESULTS {
        for meal in scoring::popular(orders, catalog, POPULAR_POOL_SIZE) {
            let already_picked = picks.iter().any(|pick| pick.id == meal.id);
            if !already_picked && !own_ids.contains(meal.id.as_str()) {
                picks.push(meal);
            }
        }
    }

    picks.truncate(USER_RECOMMENDATION_LIMIT);
    picks.into_iter().cloned().collect()
}

/// Scores every catalog meal not in the cart and returns the best 3.
///
/// See [`cart_affinity_score`] for the weights. Equal scores are ordered by
/// ascending meal id.
#[must_use]
pub fn cart_recommendations(
    user_id: &str,
    cart_items: &[CartItem],
    orders: &[OrderRecord],
    catalog: &Catalog,
) -> Vec<MealRecord> {
    let cart_ids: HashSet<&str> = cart_items.iter().map(|item| item.id.as_str()).collect();

    let cart_meals: Vec<&MealRecord> = catalog
        .list()
        .iter()
        .filter(|meal| cart_ids.contains(meal.id.as_str()))
        .collect();
    let cart_categories: HashSet<&str> = cart_meals
        .iter()
        .map(|meal| meal.category.as_str())
        .filter(|category| !category.is_empty())
        .collect();
    let cart_tags: HashSet<&str> = cart_meals
        .iter()
        .flat_map(|meal| meal.tags.iter().map(String::as_str))
        .collect();
    debug!(?cart_categories, ?cart_tags, "Cart profile");

    let past_ids: HashSet<&str> = orders
        .iter()
        .filter(|order| order.placed_by(user_id))
        .flat_map(|order| order.items.iter().map(|item| item.id.as_str()))
        .collect();

    let mut scored: Vec<(f64, &MealRecord)> = catalog
        .list()
        .iter()
        .filter(|meal| !cart_ids.contains(meal.id.as_str()))
        .map(|meal| {
            (
                cart_affinity_score(meal, &cart_categories, &cart_tags, &past_ids),
                meal,
            )
        })
        .collect();

    scored.sort_by(|(score_a, meal_a), (score_b, meal_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| meal_a.id.cmp(&meal_b.id))
    });

    scored
        .into_iter()
        .take(CART_RECOMMENDATION_LIMIT)
        .map(|(_, meal)| meal.clone())
        .collect()
}

/// Filters the catalog by diet and allergies and ranks it by health score.
///
/// Favorite cuisines are moved to the front first, but the health score sort
/// that follows dominates; cuisine preference only breaks health score ties.
#[must_use]
pub fn health_recommendations(preferences: &PreferenceRecord, catalog: &Catalog) -> Vec<MealRecord> {
    let mut meals: Vec<&MealRecord> = catalog.list().iter().collect();

    if !preferences.dietary_preferences.is_empty() {
        meals.retain(|meal| scoring::intersects(&meal.tags, &preferences.dietary_preferences));
    }

    if !preferences.allergies.is_empty() {
        meals.retain(|meal| !meal.contains_any_allergen(&preferences.allergies));
    }

    if !preferences.favorite_cuisines.is_empty() {
        meals.sort_by_key(|meal| !preferences.favorite_cuisines.contains(&meal.category));
    }

    meals.sort_by(|a, b| {
        health_score(b)
            .partial_cmp(&health_score(a))
            .unwrap_or(Ordering::Equal)
    });

    meals
        .into_iter()
        .take(HEALTH_RECOMMENDATION_LIMIT)
        .cloned()
        .collect()
}
