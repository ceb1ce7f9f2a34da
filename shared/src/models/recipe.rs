//! Recipe model - maps a catalog item to its ingredient requirements

use super::inventory::UnitOfMeasure;
use serde::{Deserialize, Serialize};

/// One ingredient requirement of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientRequirement {
    pub inventory_item_id: String,
    /// Quantity consumed per serving sold
    pub quantity_per_serving: f64,
    pub unit: UnitOfMeasure,
}

/// Recipe for a (restaurant, catalog item) pair.
///
/// A catalog item with no active recipe is a valid state - nothing is
/// tracked for it. Staff edits create new versions; the resolver picks
/// the highest active version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub restaurant_id: String,
    pub catalog_item_id: String,
    /// Servings produced by one pass of the recipe
    pub yield_servings: f64,
    /// Ordered ingredient list
    pub ingredients: Vec<IngredientRequirement>,
    pub version: u32,
    pub active: bool,
    pub created_at: i64,
}

impl Recipe {
    pub fn new(
        restaurant_id: impl Into<String>,
        catalog_item_id: impl Into<String>,
        ingredients: Vec<IngredientRequirement>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.into(),
            catalog_item_id: catalog_item_id.into(),
            yield_servings: 1.0,
            ingredients,
            version: 1,
            active: true,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
