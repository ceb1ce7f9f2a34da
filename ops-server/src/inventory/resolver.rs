//! Recipe resolver - maps (restaurant, catalog item) to its active recipe

use std::sync::Arc;

use shared::models::Recipe;

use crate::store::{RecipeStore, StoreResult};

/// Read-only lookup over the recipe catalog.
///
/// Staff tooling owns recipe writes; the resolver only picks the active
/// version for a sale and enforces tenant scoping on the way out.
pub struct RecipeResolver {
    recipes: Arc<dyn RecipeStore>,
}

impl RecipeResolver {
    pub fn new(recipes: Arc<dyn RecipeStore>) -> Self {
        Self { recipes }
    }

    /// Active recipe for the pair, or None when the item tracks no
    /// ingredients (a valid state)
    pub async fn resolve(
        &self,
        restaurant_id: &str,
        catalog_item_id: &str,
    ) -> StoreResult<Option<Recipe>> {
        let recipe = self.recipes.active_for(restaurant_id, catalog_item_id).await?;
        // Cross-restaurant references are never permitted; a mismatched
        // record is treated as absent rather than leaked
        Ok(recipe.filter(|r| r.restaurant_id == restaurant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecipeStore;

    #[tokio::test]
    async fn test_resolve_scopes_by_restaurant() {
        let store = Arc::new(InMemoryRecipeStore::new());
        store
            .upsert(Recipe::new("rest-1", "pizza", vec![]))
            .await
            .unwrap();
        let resolver = RecipeResolver::new(store);

        assert!(resolver.resolve("rest-1", "pizza").await.unwrap().is_some());
        assert!(resolver.resolve("rest-2", "pizza").await.unwrap().is_none());
    }
}
