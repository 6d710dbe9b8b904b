//! Scoring and grouping primitives shared by recommendations and analytics.
//!
//! Everything here is pure: popularity ranking over order lines, the cart
//! affinity and health scores, and the calendar buckets used for sales trends.

use crate::{
    core::catalog::Catalog,
    errors::{Error, Result},
    models::{MealRecord, OrderRecord},
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

/// Points for sharing a category with something in the cart.
pub const CATEGORY_MATCH_WEIGHT: f64 = 2.0;
/// Points per tag shared with the cart.
pub const TAG_MATCH_WEIGHT: f64 = 1.5;
/// Adjustment for meals the user already bought. Negative: prefer novelty.
pub const PAST_PURCHASE_ADJUSTMENT: f64 = -1.0;
/// Points for meals tagged `popular`.
pub const POPULAR_TAG_BOOST: f64 = 0.5;
/// Flat bonus for meals tagged `healthy` that carry nutrition facts.
pub const HEALTHY_TAG_BONUS: f64 = 10.0;

/// Ranks item ids by how many order lines reference them.
///
/// Every line counts once regardless of its quantity. Ties keep the order in
/// which ids were first seen.
#[must_use]
pub fn popularity_ranking(orders: &[OrderRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for item in orders.iter().flat_map(|order| &order.items) {
        if let Some(&position) = positions.get(item.id.as_str()) {
            counts[position].1 += 1;
        } else {
            positions.insert(item.id.as_str(), counts.len());
            counts.push((item.id.clone(), 1));
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The `limit` most popular meals that still exist in the catalog.
#[must_use]
pub fn popular<'a>(orders: &[OrderRecord], catalog: &'a Catalog, limit: usize) -> Vec<&'a MealRecord> {
    popularity_ranking(orders)
        .into_iter()
        .filter_map(|(id, _)| catalog.by_id(&id))
        .take(limit)
        .collect()
}

/// Scores how well `meal` complements a cart.
///
/// # Arguments
/// * `cart_categories` - categories of the meals in the cart
/// * `cart_tags` - union of the tags of the meals in the cart
/// * `past_ids` - ids the user ordered before
#[must_use]
pub fn cart_affinity_score(
    meal: &MealRecord,
    cart_categories: &HashSet<&str>,
    cart_tags: &HashSet<&str>,
    past_ids: &HashSet<&str>,
) -> f64 {
    let mut score = 0.0;

    if cart_categories.contains(meal.category.as_str()) {
        score += CATEGORY_MATCH_WEIGHT;
    }

    #[allow(clippy::cast_precision_loss)]
    let shared_tags = overlap_count(&meal.tags, cart_tags) as f64;
    score += TAG_MATCH_WEIGHT * shared_tags;

    if past_ids.contains(meal.id.as_str()) {
        score += PAST_PURCHASE_ADJUSTMENT;
    }

    if meal.has_tag("popular") {
        score += POPULAR_TAG_BOOST;
    }

    score
}

/// `3*protein + 2*fiber - calories/100 - fat/2`, plus a bonus for `healthy`.
///
/// Meals without nutrition facts score 0, bonus included.
#[must_use]
pub fn health_score(meal: &MealRecord) -> f64 {
    let Some(info) = meal.nutritional_info else {
        return 0.0;
    };

    let bonus = if meal.has_tag("healthy") {
        HEALTHY_TAG_BONUS
    } else {
        0.0
    };

    info.protein * 3.0 + info.fiber * 2.0 - info.calories / 100.0 - info.fat / 2.0 + bonus
}

/// Number of distinct values of `values` that appear in `set`.
#[must_use]
pub fn overlap_count(values: &[String], set: &HashSet<&str>) -> usize {
    values
        .iter()
        .map(String::as_str)
        .filter(|value| set.contains(value))
        .collect::<HashSet<_>>()
        .len()
}

/// Whether the two lists share at least one value.
#[must_use]
pub fn intersects(a: &[String], b: &[String]) -> bool {
    a.iter().any(|value| b.contains(value))
}

/// Granularity of the sales trend buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    /// `YYYY-MM-DD`
    #[default]
    Daily,
    /// `YYYY-W<n>`, week of month
    Weekly,
    /// `YYYY-MM`
    Monthly,
}

impl SalesPeriod {
    /// Bucket key for `date`, computed in UTC.
    ///
    /// Week numbers count from the first day of the month, shifted by the
    /// weekday that month starts on (Sunday = 0), so week 1 may be short.
    #[must_use]
    pub fn bucket_key(self, date: DateTime<Utc>) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let first_weekday_offset = date
                    .date_naive()
                    .with_day(1)
                    .map_or(0, |first| first.weekday().num_days_from_sunday());
                let week = (date.day() + first_weekday_offset).div_ceil(7);
                format!("{}-W{week}", date.year())
            }
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }
}

impl FromStr for SalesPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::invalid_input(format!(
                "unknown period '{other}', expected daily, weekly or monthly"
            ))),
        }
    }
}

impl fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[test]
    fn test_popularity_counts_lines_not_quantity() {
        let orders = vec![
            order("o1", "a@x.com", &[("m1", 10)]),
            order("o2", "b@x.com", &[("m2", 1)]),
            order("o3", "c@x.com", &[("m2", 1), ("m1", 1)]),
            order("o4", "d@x.com", &[("m2", 1)]),
        ];

        let ranking = popularity_ranking(&orders);
        assert_eq!(
            ranking,
            vec![("m2".to_string(), 3), ("m1".to_string(), 2)]
        );
    }

    #[test]
    fn test_popularity_ties_keep_first_seen_order() {
        let orders = vec![
            order("o1", "a@x.com", &[("m3", 1), ("m1", 1)]),
            order("o2", "b@x.com", &[("m2", 1)]),
        ];

        let ids: Vec<String> = popularity_ranking(&orders).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["m3", "m1", "m2"]);
    }

    #[test]
    fn test_popular_drops_unknown_ids_before_limiting() {
        let catalog = Catalog::from_meals(vec![meal("m1", "italian"), meal("m2", "italian")]);
        let orders = vec![
            order("o1", "a@x.com", &[("ghost", 1)]),
            order("o2", "a@x.com", &[("ghost", 1), ("m2", 1)]),
            order("o3", "b@x.com", &[("m1", 1)]),
        ];

        let ids: Vec<&str> = popular(&orders, &catalog, 2).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
    }

    #[test]
    fn test_cart_affinity_score_components() {
        let candidate = meal_with("m2", "italian", &["cheesy", "baked", "popular"]);
        let categories: HashSet<&str> = ["italian"].into_iter().collect();
        let tags: HashSet<&str> = ["cheesy", "baked", "spicy"].into_iter().collect();
        let none: HashSet<&str> = HashSet::new();

        // 2.0 category + 2 * 1.5 tags + 0.5 popular
        assert_eq!(cart_affinity_score(&candidate, &categories, &tags, &none), 5.5);

        let past: HashSet<&str> = ["m2"].into_iter().collect();
        assert_eq!(cart_affinity_score(&candidate, &categories, &tags, &past), 4.5);
    }

    #[test]
    fn test_health_score_formula() {
        let mut bowl = with_nutrition(meal("m1", "bowls"), 500.0, 30.0, 20.0, 8.0);
        // 90 + 16 - 5 - 10
        assert_eq!(health_score(&bowl), 91.0);

        bowl.tags.push("healthy".to_string());
        assert_eq!(health_score(&bowl), 101.0);
    }

    #[test]
    fn test_health_score_without_nutrition_ignores_healthy_tag() {
        let salad = meal_with("m1", "salads", &["healthy"]);
        assert_eq!(health_score(&salad), 0.0);
    }

    #[test]
    fn test_overlap_counts_distinct_values() {
        let set: HashSet<&str> = ["a", "b"].into_iter().collect();
        let values = vec!["a".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(overlap_count(&values, &set), 1);
        assert!(intersects(&values, &["c".to_string()]));
        assert!(!intersects(&values, &[]));
    }

    #[test]
    fn test_bucket_keys() {
        // 2024-06-01 is a Saturday (offset 6)
        let date = Utc.with_ymd_and_hms(2024, 6, 2, 23, 30, 0).unwrap();
        assert_eq!(SalesPeriod::Daily.bucket_key(date), "2024-06-02");
        assert_eq!(SalesPeriod::Weekly.bucket_key(date), "2024-W2");
        assert_eq!(SalesPeriod::Monthly.bucket_key(date), "2024-06");

        let first = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(SalesPeriod::Weekly.bucket_key(first), "2024-W1");
    }

    #[test]
    fn test_weekly_bucket_for_month_starting_sunday() {
        // 2024-09-01 is a Sunday (offset 0): days 1-7 are week 1
        let seventh = Utc.with_ymd_and_hms(2024, 9, 7, 12, 0, 0).unwrap();
        let eighth = Utc.with_ymd_and_hms(2024, 9, 8, 12, 0, 0).unwrap();
        assert_eq!(SalesPeriod::Weekly.bucket_key(seventh), "2024-W1");
        assert_eq!(SalesPeriod::Weekly.bucket_key(eighth), "2024-W2");
    }

    #[test]
    fn test_parse_sales_period() {
        assert_eq!("weekly".parse::<SalesPeriod>().unwrap(), SalesPeriod::Weekly);
        assert_eq!(" Monthly ".parse::<SalesPeriod>().unwrap(), SalesPeriod::Monthly);
        assert!(matches!(
            "hourly".parse::<SalesPeriod>(),
            Err(Error::InvalidInput { .. })
        ));
    }
}
