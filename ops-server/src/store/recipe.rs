//! Recipe store - versioned recipes per (restaurant, catalog item)

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::Recipe;

use super::StoreResult;

/// Read side of the catalog/recipe administration surface.
///
/// The core only reads recipes; staff tooling is the sole writer.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn upsert(&self, recipe: Recipe) -> StoreResult<()>;

    /// Highest active version for the pair, or None
    async fn active_for(
        &self,
        restaurant_id: &str,
        catalog_item_id: &str,
    ) -> StoreResult<Option<Recipe>>;
}

/// In-memory recipe store keyed by (restaurant, catalog item)
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    recipes: DashMap<(String, String), Vec<Recipe>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn upsert(&self, recipe: Recipe) -> StoreResult<()> {
        let key = (recipe.restaurant_id.clone(), recipe.catalog_item_id.clone());
        let mut versions = self.recipes.entry(key).or_default();
        versions.retain(|r| r.version != recipe.version);
        versions.push(recipe);
        Ok(())
    }

    async fn active_for(
        &self,
        restaurant_id: &str,
        catalog_item_id: &str,
    ) -> StoreResult<Option<Recipe>> {
        let key = (restaurant_id.to_string(), catalog_item_id.to_string());
        Ok(self.recipes.get(&key).and_then(|versions| {
            versions
                .iter()
                .filter(|r| r.active)
                .max_by_key(|r| r.version)
                .cloned()
        }))
    }
}
